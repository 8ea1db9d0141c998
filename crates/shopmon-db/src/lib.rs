//! Persistence layer for the shopmon presence pipeline (`PostgreSQL`).
//!
//! The flush loop in `shopmon-core` hands this crate one
//! `(timestamp, sensor, area)` row at a time; each row becomes one
//! parameterized INSERT into the append-only `shopmon` table.
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration, migrations
//! - [`presence_store`] -- the `shopmon` table store (implements the
//!   core sink seam)
//! - [`error`] -- shared error types

pub mod error;
pub mod postgres;
pub mod presence_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use presence_store::{PresenceStore, ShopmonRow};
