//! The presence table: per-sensor most-recent-observation state.
//!
//! A single [`PresenceTable`] is shared (via [`Arc`]) between the ingest
//! loop, which folds observations in, and the flush loop, which reads the
//! whole table once per tick. All access goes through one mutex; the lock
//! is held only for a single update or a single snapshot copy, never
//! across an await point.
//!
//! Entries are inserted or overwritten, never removed. The table grows
//! with the number of distinct sensors seen since process start and every
//! entry is re-flushed each tick until it is overwritten.
//!
//! [`Arc`]: std::sync::Arc

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::record::{Observation, SensorKey};

/// Intended lifetime, in seconds, of an active presence record before it
/// would be considered stale. Carried over from the first cut of this
/// pipeline, where it was declared but never wired into an eviction path;
/// the table currently retains every entry for the life of the process.
/// Whether stale sensors should expire is still an open product decision.
pub const SENSOR_EXPIRY_SECS: u64 = 10;

/// Concurrent map from [`SensorKey`] to the latest timestamp applied for
/// that sensor.
///
/// The update rule is last-APPLIED-wins, not newest-timestamp-wins: an
/// observation carrying an older timestamp than the stored one still
/// overwrites it if it is processed later. The feed is trusted to be
/// roughly ordered; the table does not second-guess it.
#[derive(Debug, Default)]
pub struct PresenceTable {
    entries: Mutex<HashMap<SensorKey, DateTime<Utc>>>,
}

impl PresenceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the table lock.
    ///
    /// A poisoned lock is recovered rather than propagated: every
    /// mutation is a single map insert, so the map is structurally sound
    /// even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, HashMap<SensorKey, DateTime<Utc>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fold one observation into the table.
    ///
    /// Unconditionally overwrites any existing entry for the same sensor
    /// and area; the previous timestamp is never compared against the new
    /// one.
    pub fn update(&self, observation: &Observation) {
        self.lock().insert(observation.key(), observation.timestamp);
        tracing::trace!(
            sensor = %observation.sensor,
            area = %observation.area,
            timestamp = %observation.timestamp,
            "presence entry updated"
        );
    }

    /// Take a consistent copy of the current table contents.
    ///
    /// The copy reflects exactly the updates applied before the lock was
    /// acquired and none applied after. Iteration order is unspecified.
    pub fn snapshot(&self) -> Vec<(SensorKey, DateTime<Utc>)> {
        self.lock()
            .iter()
            .map(|(key, timestamp)| (key.clone(), *timestamp))
            .collect()
    }

    /// Return the timestamp currently stored for a sensor, if any.
    pub fn last_seen(&self, key: &SensorKey) -> Option<DateTime<Utc>> {
        self.lock().get(key).copied()
    }

    /// Number of distinct sensors currently tracked.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sensor has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
