//! In-memory aggregation and periodic-flush engine for the shopmon
//! presence pipeline.
//!
//! The pipeline sits between a pub/sub event feed and a relational
//! store: sensor-presence events stream in, collapse to one
//! most-recent-observation entry per sensor, and the current entry set
//! is persisted once per tick.
//!
//! # Architecture
//!
//! ```text
//! Inbound channel (raw payloads)
//!     |
//!     +-- ingest loop --- parse --> PresenceTable (one entry per sensor)
//!                                       |
//!              flush loop (1s timer) -- snapshot --> PresenceSink
//!                                                    (one row per entry)
//! ```
//!
//! Both loops share the table through a single mutex, held only for a
//! single update or a single snapshot copy. Every detected error --
//! malformed input, rejected write -- is terminal; there is no
//! recoverable class.
//!
//! # Modules
//!
//! - [`record`] -- observation records, sensor identity, wire parsing
//! - [`table`] -- the concurrent presence table (aggregator)
//! - [`ingest`] -- the ingest loop
//! - [`flush`] -- the timer-driven flush loop
//! - [`sink`] -- the persistence seam and in-memory stub
//! - [`error`] -- terminal pipeline errors

pub mod error;
pub mod flush;
pub mod ingest;
pub mod record;
pub mod sink;
pub mod table;

// Re-export primary types for convenience.
pub use error::PipelineError;
pub use flush::{DEFAULT_FLUSH_INTERVAL, flush_once, run_flush};
pub use ingest::run_ingest;
pub use record::{AreaName, Observation, RecordError, SensorId, SensorKey};
pub use sink::{MemorySink, PresenceSink, SinkError};
pub use table::{PresenceTable, SENSOR_EXPIRY_SECS};
