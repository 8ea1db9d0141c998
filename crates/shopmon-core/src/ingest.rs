//! Ingest loop: fold inbound observations into the presence table.
//!
//! The loop consumes raw wire payloads from an unbounded channel, strictly
//! one at a time in arrival order -- no reordering, no batching. Each
//! payload is parsed and folded into the shared [`PresenceTable`].
//!
//! A payload that fails to parse is an upstream contract violation and
//! ends the loop with an error; the process is expected to die rather
//! than skip the record. The table is never left half-updated: parsing
//! happens entirely before the table is touched.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::record::Observation;
use crate::table::PresenceTable;

/// Run the ingest loop until the inbound channel closes or a payload is
/// malformed.
///
/// Returns `Ok(())` when the sending side of the channel is dropped (the
/// event source is gone and there is nothing left to ingest).
///
/// # Errors
///
/// Returns [`PipelineError::Malformed`] on the first payload that
/// violates the wire contract. No further payloads are processed.
pub async fn run_ingest(
    table: Arc<PresenceTable>,
    mut inbound: UnboundedReceiver<String>,
) -> Result<(), PipelineError> {
    info!("ingest loop started");

    while let Some(payload) = inbound.recv().await {
        let observation = Observation::parse_wire(&payload)?;
        debug!(
            sensor = %observation.sensor,
            area = %observation.area,
            timestamp = %observation.timestamp,
            "observation ingested"
        );
        table.update(&observation);
    }

    info!("inbound channel closed, ingest loop ending");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::record::SensorKey;

    #[tokio::test]
    async fn ingests_payloads_in_arrival_order() {
        let table = Arc::new(PresenceTable::new());
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send("1700000000,HotMetals-2,Hot Metals".to_owned()).unwrap();
        tx.send("1700000050,HotMetals-2,Hot Metals".to_owned()).unwrap();
        tx.send("1700000010,Paint-1,Paint Shop".to_owned()).unwrap();
        drop(tx);

        run_ingest(Arc::clone(&table), rx).await.unwrap();

        assert_eq!(table.len(), 2);
        let key = SensorKey::parse_delimited("HotMetals-2:Hot Metals").unwrap();
        let last = table.last_seen(&key).unwrap();
        assert_eq!(last.to_rfc3339(), "2023-11-14T22:14:10+00:00");
    }

    #[tokio::test]
    async fn older_timestamp_applied_later_still_wins() {
        let table = Arc::new(PresenceTable::new());
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send("100,sensor-a,area".to_owned()).unwrap();
        tx.send("50,sensor-a,area".to_owned()).unwrap();
        drop(tx);

        run_ingest(Arc::clone(&table), rx).await.unwrap();

        let key = SensorKey::parse_delimited("sensor-a:area").unwrap();
        assert_eq!(table.last_seen(&key).unwrap().timestamp(), 50);
    }

    #[tokio::test]
    async fn malformed_payload_is_fatal_and_leaves_table_intact() {
        let table = Arc::new(PresenceTable::new());
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send("1700000000,HotMetals-2,Hot Metals".to_owned()).unwrap();
        tx.send("garbage,Paint-1,Paint Shop".to_owned()).unwrap();
        tx.send("1700000099,Weld-3,Welding".to_owned()).unwrap();
        drop(tx);

        let result = run_ingest(Arc::clone(&table), rx).await;

        assert!(matches!(result, Err(PipelineError::Malformed(_))));
        // Only the record before the bad one was applied; nothing partial
        // was written for the bad one and nothing after it was processed.
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn closed_channel_ends_loop_cleanly() {
        let table = Arc::new(PresenceTable::new());
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(tx);

        run_ingest(Arc::clone(&table), rx).await.unwrap();
        assert!(table.is_empty());
    }
}
