//! Configuration for the ingest binary.
//!
//! All configuration is loaded from environment variables. The binary
//! needs to know how to reach NATS and `PostgreSQL`; the flush cadence
//! and subscription subject have sensible defaults.

use std::time::Duration;

use crate::error::IngestError;

/// Default NATS subject carrying presence payloads.
const DEFAULT_SUBJECT: &str = "shopmon.presence";

/// Default flush cadence in milliseconds.
const DEFAULT_FLUSH_INTERVAL_MS: &str = "1000";

/// Complete pipeline configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// NATS server URL (e.g. `nats://localhost:4222`).
    pub nats_url: String,
    /// NATS subject to subscribe to for presence payloads.
    pub subject: String,
    /// Cadence of the periodic flush.
    pub flush_interval: Duration,
}

impl IngestConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `DATABASE_URL` -- `PostgreSQL` connection string
    /// - `NATS_URL` -- NATS server connection string
    ///
    /// Optional variables:
    /// - `PRESENCE_SUBJECT` -- subscription subject (default `shopmon.presence`)
    /// - `FLUSH_INTERVAL_MS` -- flush cadence in milliseconds (default 1000)
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] if a required variable is missing
    /// or a value fails to parse.
    pub fn from_env() -> Result<Self, IngestError> {
        let database_url = env_var("DATABASE_URL")?;
        let nats_url = env_var("NATS_URL")?;

        let subject =
            std::env::var("PRESENCE_SUBJECT").unwrap_or_else(|_| DEFAULT_SUBJECT.to_owned());

        let flush_interval_ms: u64 = std::env::var("FLUSH_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_FLUSH_INTERVAL_MS.to_owned())
            .parse()
            .map_err(|e| IngestError::Config(format!("invalid FLUSH_INTERVAL_MS: {e}")))?;
        if flush_interval_ms == 0 {
            return Err(IngestError::Config(
                "FLUSH_INTERVAL_MS must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            nats_url,
            subject,
            flush_interval: Duration::from_millis(flush_interval_ms),
        })
    }
}

/// Read a required environment variable.
fn env_var(name: &str) -> Result<String, IngestError> {
    std::env::var(name)
        .map_err(|e| IngestError::Config(format!("missing required env var {name}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_flush_interval_parses_to_one_second() {
        // Verify the default value used in the from_env fallback.
        let default_ms: u64 = DEFAULT_FLUSH_INTERVAL_MS.parse().unwrap();
        assert_eq!(Duration::from_millis(default_ms), Duration::from_secs(1));
    }

    #[test]
    fn default_subject_is_presence() {
        assert_eq!(DEFAULT_SUBJECT, "shopmon.presence");
    }
}
