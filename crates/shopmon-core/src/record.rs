//! Observation records and sensor identity types.
//!
//! Every inbound event names a sensor, the area it is mounted in, and the
//! epoch-seconds timestamp of the activity it reports. Sensors and areas
//! are opaque names; they are wrapped in string newtypes so the two can
//! never be swapped at a call site.
//!
//! The upstream feed delivers each event as a single comma-delimited
//! string of exactly three fields: `<epoch_secs>,<sensorID>,<area>`.
//! Anything else is an upstream contract violation and parsing fails
//! hard -- see [`RecordError`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delimiter used by the legacy string rendering of a [`SensorKey`].
const KEY_DELIMITER: char = ':';

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new name from any string-like value.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Return the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
    };
}

define_name! {
    /// Opaque identifier of a single presence sensor (e.g. `HotMetals-2`).
    SensorId
}

define_name! {
    /// Opaque name of the physical area a sensor is mounted in
    /// (e.g. `Hot Metals`).
    AreaName
}

/// Errors raised while parsing an inbound observation payload.
///
/// Every variant is an upstream contract violation. There is no recovery
/// path: the ingest loop treats any of these as fatal.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The payload did not contain exactly three comma-delimited fields.
    #[error("expected 3 comma-delimited fields, found {found} in {payload:?}")]
    FieldCount {
        /// Number of fields actually present.
        found: usize,
        /// The offending payload, for the operator's post-mortem.
        payload: String,
    },

    /// The first field was not a valid integer epoch-seconds value.
    #[error("timestamp field {field:?} is not an integer epoch value")]
    Timestamp {
        /// The unparseable field.
        field: String,
    },

    /// The epoch value was outside the representable date range.
    #[error("epoch value {epoch} is outside the representable date range")]
    TimestampRange {
        /// The out-of-range epoch-seconds value.
        epoch: i64,
    },
}

/// Identity of a tracked sensor: the sensor name qualified by its area.
///
/// Two observations with the same sensor and area always compare equal
/// here, regardless of their timestamps, so each physical sensor occupies
/// exactly one slot in the presence table.
///
/// Earlier revisions of this pipeline encoded the key as a single
/// colon-joined string (`"HotMetals-2:Hot Metals"`) and re-split it at
/// flush time, which silently corrupts any name containing a colon.
/// Holding the two parts as separate fields removes that failure mode;
/// the joined form survives only as the [`Display`] rendering (used in
/// logs) and its [`parse_delimited`] inverse.
///
/// [`Display`]: core::fmt::Display
/// [`parse_delimited`]: SensorKey::parse_delimited
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SensorKey {
    /// The sensor's own identifier.
    pub sensor: SensorId,
    /// The area the sensor belongs to.
    pub area: AreaName,
}

impl SensorKey {
    /// Create a key from a sensor identifier and an area name.
    pub const fn new(sensor: SensorId, area: AreaName) -> Self {
        Self { sensor, area }
    }

    /// Parse the legacy colon-joined rendering back into a key.
    ///
    /// Splits on the FIRST colon only, so an area name containing a colon
    /// round-trips intact while a sensor name containing one does not --
    /// the historical limitation of the joined form.
    ///
    /// Returns `None` if the string contains no delimiter at all.
    pub fn parse_delimited(joined: &str) -> Option<Self> {
        let (sensor, area) = joined.split_once(KEY_DELIMITER)?;
        Some(Self {
            sensor: SensorId::from(sensor),
            area: AreaName::from(area),
        })
    }
}

impl core::fmt::Display for SensorKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{KEY_DELIMITER}{}", self.sensor, self.area)
    }
}

/// One ingested presence event: a sensor observed activity in an area at
/// a point in time. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// When the activity happened (seconds resolution).
    pub timestamp: DateTime<Utc>,
    /// Which sensor reported it.
    pub sensor: SensorId,
    /// Which area the sensor is mounted in.
    pub area: AreaName,
}

impl Observation {
    /// Create an observation from already-typed parts.
    pub const fn new(timestamp: DateTime<Utc>, sensor: SensorId, area: AreaName) -> Self {
        Self {
            timestamp,
            sensor,
            area,
        }
    }

    /// Parse a raw wire payload of the form `<epoch_secs>,<sensorID>,<area>`.
    ///
    /// The timestamp is an integer epoch-seconds value; fractional seconds
    /// are not part of the contract. Fields are taken verbatim -- no
    /// trimming, no unescaping.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the field count is not exactly three,
    /// the timestamp is not an integer, or the epoch value cannot be
    /// represented as a date.
    pub fn parse_wire(payload: &str) -> Result<Self, RecordError> {
        let fields: Vec<&str> = payload.split(',').collect();
        let [raw_timestamp, sensor, area] = fields.as_slice() else {
            return Err(RecordError::FieldCount {
                found: fields.len(),
                payload: payload.to_owned(),
            });
        };

        let epoch: i64 = raw_timestamp
            .parse()
            .map_err(|_parse_err| RecordError::Timestamp {
                field: (*raw_timestamp).to_owned(),
            })?;

        let timestamp = DateTime::from_timestamp(epoch, 0)
            .ok_or(RecordError::TimestampRange { epoch })?;

        Ok(Self {
            timestamp,
            sensor: SensorId::from(*sensor),
            area: AreaName::from(*area),
        })
    }

    /// Derive the presence-table key for this observation.
    pub fn key(&self) -> SensorKey {
        SensorKey::new(self.sensor.clone(), self.area.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_payload() {
        let obs = Observation::parse_wire("1700000000,HotMetals-2,Hot Metals").unwrap();
        assert_eq!(obs.sensor.as_str(), "HotMetals-2");
        assert_eq!(obs.area.as_str(), "Hot Metals");
        assert_eq!(obs.timestamp.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn parse_rejects_too_few_fields() {
        let err = Observation::parse_wire("1700000000,HotMetals-2").unwrap_err();
        assert!(matches!(err, RecordError::FieldCount { found: 2, .. }));
    }

    #[test]
    fn parse_rejects_too_many_fields() {
        let err = Observation::parse_wire("1700000000,a,b,c").unwrap_err();
        assert!(matches!(err, RecordError::FieldCount { found: 4, .. }));
    }

    #[test]
    fn parse_rejects_non_integer_timestamp() {
        let err = Observation::parse_wire("not-a-number,HotMetals-2,Hot Metals").unwrap_err();
        assert!(matches!(err, RecordError::Timestamp { .. }));
    }

    #[test]
    fn parse_rejects_out_of_range_epoch() {
        let err = Observation::parse_wire("9223372036854775807,a,b").unwrap_err();
        assert!(matches!(err, RecordError::TimestampRange { .. }));
    }

    #[test]
    fn key_ignores_timestamp() {
        let first = Observation::parse_wire("1700000000,HotMetals-2,Hot Metals").unwrap();
        let later = Observation::parse_wire("1700000050,HotMetals-2,Hot Metals").unwrap();
        assert_eq!(first.key(), later.key());
    }

    #[test]
    fn key_display_round_trips_for_colon_free_names() {
        let key = SensorKey::new(SensorId::from("HotMetals-2"), AreaName::from("Hot Metals"));
        let joined = key.to_string();
        assert_eq!(joined, "HotMetals-2:Hot Metals");
        assert_eq!(SensorKey::parse_delimited(&joined), Some(key));
    }

    #[test]
    fn parse_delimited_splits_on_first_colon() {
        let key = SensorKey::parse_delimited("sensor:area:with:colons").unwrap();
        assert_eq!(key.sensor.as_str(), "sensor");
        assert_eq!(key.area.as_str(), "area:with:colons");
    }

    #[test]
    fn parse_delimited_requires_a_delimiter() {
        assert_eq!(SensorKey::parse_delimited("no-delimiter-here"), None);
    }

    #[test]
    fn observation_serializes_with_typed_fields() {
        let obs = Observation::parse_wire("1700000000,HotMetals-2,Hot Metals").unwrap();
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json.get("sensor").and_then(|v| v.as_str()), Some("HotMetals-2"));
        assert_eq!(json.get("area").and_then(|v| v.as_str()), Some("Hot Metals"));
    }
}
