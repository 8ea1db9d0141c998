//! Persistence sink seam and in-memory stub.
//!
//! The flush loop does not know what durable storage looks like; it only
//! needs something that can append one `(timestamp, sensor, area)` row at
//! a time. The [`PresenceSink`] trait abstracts that collaborator -- in
//! production it is the `PostgreSQL` store from `shopmon-db`, in tests it
//! is the [`MemorySink`] stub defined here.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::record::{AreaName, SensorId};

/// A persistence write was rejected by the sink.
///
/// The flush loop treats any sink error as fatal: no retry, no
/// skip-and-continue. Downstream operators rely on process death as the
/// failure signal, so implementations must surface every rejected write.
#[derive(Debug, thiserror::Error)]
#[error("presence sink error: {message}")]
pub struct SinkError {
    /// Description of the rejected write.
    pub message: String,
}

impl SinkError {
    /// Create a sink error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Destination for flushed presence rows.
///
/// Implementations durably store one row per call. The flush loop blocks
/// on each call; `append` is expected to either succeed or return an
/// error the caller will treat as terminal.
pub trait PresenceSink {
    /// Durably store one `(timestamp, sensor, area)` row.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the write is rejected; the caller treats
    /// this as fatal.
    fn append(
        &self,
        timestamp: DateTime<Utc>,
        sensor: &SensorId,
        area: &AreaName,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// One row as recorded by the [`MemorySink`] stub.
pub type MemoryRow = (DateTime<Utc>, SensorId, AreaName);

/// An in-memory sink that records every appended row.
///
/// Used to exercise the flush loop without a live database.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<MemoryRow>>,
}

impl MemorySink {
    /// Create an empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of every row appended so far, in append order.
    pub fn rows(&self) -> Vec<MemoryRow> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PresenceSink for MemorySink {
    async fn append(
        &self,
        timestamp: DateTime<Utc>,
        sensor: &SensorId,
        area: &AreaName,
    ) -> Result<(), SinkError> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((timestamp, sensor.clone(), area.clone()));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_records_rows_in_order() {
        let sink = MemorySink::new();
        let first = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let second = DateTime::from_timestamp(1_700_000_050, 0).unwrap();

        sink.append(first, &SensorId::from("a"), &AreaName::from("x"))
            .await
            .unwrap();
        sink.append(second, &SensorId::from("b"), &AreaName::from("y"))
            .await
            .unwrap();

        let rows = sink.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.first().map(|(t, ..)| *t), Some(first));
        assert_eq!(rows.get(1).map(|(t, ..)| *t), Some(second));
    }

    #[test]
    fn sink_error_display_carries_message() {
        let err = SinkError::new("duplicate key value");
        assert!(format!("{err}").contains("duplicate key value"));
    }
}
