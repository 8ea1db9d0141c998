//! Presence pipeline binary for the shopmon system.
//!
//! This is the entry point that wires the NATS intake, the in-memory
//! aggregation loops, and the `PostgreSQL` sink together. Sensors on the
//! shop floor publish raw presence payloads; the pipeline collapses them
//! to one most-recent-observation entry per sensor and flushes the whole
//! entry set to the database once per tick.
//!
//! # Architecture
//!
//! ```text
//! NATS (presence payloads) --> ingest loop --> PresenceTable
//!                                                  |
//!                            flush loop (timer) ---+--> PostgreSQL
//! ```
//!
//! Every detected error is terminal: a malformed payload, a rejected
//! database write, or a lost connection ends the process with a non-zero
//! exit. Operators rely on process death as the failure signal.

mod config;
mod error;
mod nats;

use std::sync::Arc;

use shopmon_core::table::PresenceTable;
use shopmon_core::{run_flush, run_ingest};
use shopmon_db::{PostgresPool, PresenceStore};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::IngestConfig;
use crate::nats::NatsClient;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// connects to `PostgreSQL` and NATS, then runs the intake, ingest, and
/// flush loops until the source closes or the first fatal error.
///
/// # Errors
///
/// Returns an error if initialization or any pipeline loop fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("shopmon-ingest starting");

    // 2. Load configuration from environment.
    let config = IngestConfig::from_env()?;
    info!(
        nats_url = config.nats_url,
        subject = config.subject,
        flush_interval_ms = config.flush_interval.as_millis(),
        "configuration loaded"
    );

    // 3. Connect to PostgreSQL and apply migrations.
    let pool = PostgresPool::connect_url(&config.database_url).await?;
    pool.run_migrations().await?;

    // 4. Connect to NATS and subscribe to the presence subject.
    let nats_client = NatsClient::connect(&config.nats_url).await?;
    let subscriber = nats_client.subscribe(&config.subject).await?;

    // 5. Assemble the pipeline: shared table, inbound channel, sink.
    let table = Arc::new(PresenceTable::new());
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let store = PresenceStore::new(pool.pool());

    info!("pipeline assembled, entering loops");

    // 6. Run all three loops concurrently; the first one to finish
    //    decides how the process ends. An error from any loop propagates
    //    out of main (non-zero exit); a clean intake or ingest end means
    //    the event source is gone and there is nothing left to do.
    tokio::select! {
        result = NatsClient::forward_payloads(subscriber, inbound_tx) => {
            result?;
            info!("event source ended, shutting down");
        }
        result = run_ingest(Arc::clone(&table), inbound_rx) => {
            result?;
            info!("ingest loop ended, shutting down");
        }
        result = run_flush(Arc::clone(&table), &store, config.flush_interval) => {
            // The flush loop only ever returns on a rejected write.
            result?;
        }
    }

    // 7. Graceful teardown.
    pool.close().await;
    info!("shopmon-ingest shutdown complete");

    Ok(())
}
