//! Time keys for time-indexed layers.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FieldError, FieldResult};

/// Formatting granularity of time keys (whole hours, UTC).
const KEY_FORMAT: &str = "%Y%m%d%H";

/// Canonical hour-resolution key derived from a timestamp.
///
/// Timestamps that format to the same key are the same key: adding a
/// second field at 12:45 replaces the one added at 12:10.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeKey(String);

impl TimeKey {
    /// Derive the key for a timestamp in any time zone.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self(dt.with_timezone(&Utc).format(KEY_FORMAT).to_string())
    }

    /// Parse a key in `YYYYMMDDHH` form.
    pub fn parse(s: &str) -> FieldResult<Self> {
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldError::InvalidTime(s.to_string()));
        }
        let key = Self(s.to_string());
        key.to_datetime()?;
        Ok(key)
    }

    /// The top-of-hour UTC timestamp this key stands for.
    pub fn to_datetime(&self) -> FieldResult<DateTime<Utc>> {
        // Minutes are appended so the parser has a complete time of day
        let ndt = NaiveDateTime::parse_from_str(&format!("{}00", self.0), "%Y%m%d%H%M")
            .map_err(|e| FieldError::InvalidTime(format!("{}: {}", self.0, e)))?;
        Ok(Utc.from_utc_datetime(&ndt))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a valid time for model data.
///
/// Combines reference time (model run time) and forecast offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidTime {
    /// Model run/reference time
    pub reference_time: DateTime<Utc>,
    /// Forecast hour offset from reference time
    pub forecast_hour: u32,
}

impl ValidTime {
    pub fn new(reference_time: DateTime<Utc>, forecast_hour: u32) -> Self {
        Self {
            reference_time,
            forecast_hour,
        }
    }

    /// Create from analysis time (forecast_hour = 0)
    pub fn analysis(reference_time: DateTime<Utc>) -> Self {
        Self {
            reference_time,
            forecast_hour: 0,
        }
    }

    /// Calculate the actual valid time (reference + forecast offset)
    pub fn valid_datetime(&self) -> DateTime<Utc> {
        self.reference_time + Duration::hours(self.forecast_hour as i64)
    }

    /// Layer key for the valid time.
    pub fn time_key(&self) -> TimeKey {
        TimeKey::from_datetime(&self.valid_datetime())
    }
}
