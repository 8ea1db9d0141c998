//! Operations on the `shopmon` presence table.
//!
//! The table is append-only: the flush loop writes one row per tracked
//! sensor per tick, and an unchanged sensor lands again on every tick.
//! Rows are never updated or deleted here; history accumulates by
//! design and downstream consumers build timelines from it.

use chrono::{DateTime, Utc};
use shopmon_core::record::{AreaName, SensorId};
use shopmon_core::sink::{PresenceSink, SinkError};
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the `shopmon` table.
pub struct PresenceStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PresenceStore<'a> {
    /// Create a new presence store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert one presence row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert is rejected.
    pub async fn append_row(
        &self,
        timestamp: DateTime<Utc>,
        sensor: &SensorId,
        area: &AreaName,
    ) -> Result<(), DbError> {
        sqlx::query("INSERT INTO shopmon (datetime, sensor, area) VALUES ($1, $2, $3)")
            .bind(timestamp)
            .bind(sensor.as_str())
            .bind(area.as_str())
            .execute(self.pool)
            .await?;

        tracing::debug!(
            sensor = %sensor,
            area = %area,
            timestamp = %timestamp,
            "presence row inserted"
        );
        Ok(())
    }

    /// Query the most recently inserted rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ShopmonRow>, DbError> {
        let rows = sqlx::query_as::<_, ShopmonRow>(
            r"SELECT id, datetime, sensor, area
              FROM shopmon
              ORDER BY id DESC
              LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

impl PresenceSink for PresenceStore<'_> {
    async fn append(
        &self,
        timestamp: DateTime<Utc>,
        sensor: &SensorId,
        area: &AreaName,
    ) -> Result<(), SinkError> {
        self.append_row(timestamp, sensor, area)
            .await
            .map_err(|e| SinkError::new(e.to_string()))
    }
}

impl std::fmt::Debug for PresenceStore<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceStore").finish()
    }
}

/// A row from the `shopmon` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShopmonRow {
    /// Auto-incremented row ID (insert order).
    pub id: i64,
    /// The observation timestamp that was flushed.
    pub datetime: DateTime<Utc>,
    /// Sensor identifier.
    pub sensor: String,
    /// Area name.
    pub area: String,
}
