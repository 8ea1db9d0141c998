//! Error types for the ingest binary.
//!
//! Uses `thiserror` for typed errors that surface through process
//! bootstrap and intake: configuration, NATS connectivity, database
//! setup, and the pipeline loops themselves. Every variant is fatal --
//! the binary exits non-zero on the first error it sees.

use shopmon_core::PipelineError;
use shopmon_db::DbError;

/// Errors that can occur while bootstrapping or running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Failed to connect to or communicate with the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),

    /// A message payload was not valid UTF-8.
    #[error("payload error: {0}")]
    Payload(String),

    /// Database connection or migration failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// A pipeline loop failed terminally.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
