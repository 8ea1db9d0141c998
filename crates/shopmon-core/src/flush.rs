//! Flush loop: persist the presence table on a fixed cadence.
//!
//! A timer is the sole driver of persistence -- there is no
//! event-triggered flush. On each tick the loop copies the table under
//! its lock, then writes one row per entry to the sink. Entries are not
//! removed after flushing: every tick persists the current best-known
//! state of every tracked sensor, so an unchanged entry is written again
//! on every subsequent tick. Deduplication across ticks is explicitly not
//! this pipeline's job.
//!
//! Any sink error ends the loop immediately -- no retry, no
//! skip-and-continue. The process dies and the operator finds out.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::sink::PresenceSink;
use crate::table::PresenceTable;

/// Default cadence of the flush timer.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Write the current table contents to the sink, one row per entry.
///
/// Does nothing when the table is empty. The snapshot is taken once, so a
/// concurrent update during the writes affects the next flush, not this
/// one. Iteration order is unspecified.
///
/// # Errors
///
/// Returns [`PipelineError::Sink`] on the first rejected write; remaining
/// entries are not attempted.
pub async fn flush_once<S: PresenceSink>(
    table: &PresenceTable,
    sink: &S,
) -> Result<(), PipelineError> {
    let entries = table.snapshot();
    if entries.is_empty() {
        return Ok(());
    }

    for (key, timestamp) in &entries {
        sink.append(*timestamp, &key.sensor, &key.area).await?;
    }

    debug!(rows = entries.len(), "presence table flushed");
    Ok(())
}

/// Run the flush loop forever (or until the sink rejects a write).
///
/// Wakes once per `interval` and calls [`flush_once`]. A slow flush
/// delays the next tick rather than bursting to catch up, so two flushes
/// never overlap.
///
/// # Errors
///
/// Returns [`PipelineError::Sink`] when a write is rejected. This is the
/// only way the loop ends.
pub async fn run_flush<S: PresenceSink>(
    table: Arc<PresenceTable>,
    sink: &S,
    interval: Duration,
) -> Result<(), PipelineError> {
    info!(interval_ms = interval.as_millis(), "flush loop started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately; consume it so
    // the first flush happens one full interval after startup.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        flush_once(&table, sink).await?;
    }
}
