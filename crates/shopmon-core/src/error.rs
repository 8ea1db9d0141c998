//! Error types for the aggregation pipeline.
//!
//! There is no recoverable class of error in this pipeline: malformed
//! input and rejected persistence writes both terminate the process.
//! [`PipelineError`] is the terminal failure surfaced from either loop to
//! whoever is running them.

use crate::record::RecordError;
use crate::sink::SinkError;

/// Terminal failures of the ingest and flush loops.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// An inbound payload violated the wire contract.
    #[error("malformed observation record: {0}")]
    Malformed(#[from] RecordError),

    /// The persistence sink rejected a write.
    #[error(transparent)]
    Sink(#[from] SinkError),
}
