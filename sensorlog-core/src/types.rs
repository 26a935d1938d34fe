//! Core types for SensorLog

use crate::config::EMBEDDED_EPOCH_OFFSET;
use crate::{Result, SensorLogError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use std::time::Duration;

/// Timestamp in whole seconds since the Unix epoch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from seconds since 1970-01-01 UTC
    pub const fn from_unix(secs: i64) -> Self {
        Self(secs)
    }

    /// Create a timestamp from seconds since 2000-01-01 UTC (device RTC epoch).
    ///
    /// Saturates at the `i64` range; see [`Timestamp::try_from_embedded`].
    pub const fn from_embedded(secs: i64) -> Self {
        Self(secs.saturating_add(EMBEDDED_EPOCH_OFFSET))
    }

    /// Like [`Timestamp::from_embedded`], but fails instead of saturating
    pub fn try_from_embedded(secs: i64) -> Result<Self> {
        secs.checked_add(EMBEDDED_EPOCH_OFFSET)
            .map(Self)
            .ok_or_else(|| {
                SensorLogError::InvalidTimestamp(format!(
                    "embedded time {} is out of range",
                    secs
                ))
            })
    }

    /// Current wall-clock time, truncated to seconds
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    /// Seconds since the Unix epoch
    pub const fn as_unix(&self) -> i64 {
        self.0
    }

    /// Seconds since the embedded epoch
    pub const fn as_embedded(&self) -> i64 {
        self.0.saturating_sub(EMBEDDED_EPOCH_OFFSET)
    }

    /// Signed number of seconds from `earlier` to `self`
    pub fn duration_since(&self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Render as an RFC 3339 UTC string, e.g. `2024-05-01T12:00:00Z`
    pub fn to_rfc3339(&self) -> String {
        match DateTime::<Utc>::from_timestamp(self.0, 0) {
            Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
            None => self.0.to_string(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Forward so width/alignment flags apply to the number
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Timestamp {
    type Err = SensorLogError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Timestamp)
            .map_err(|e| SensorLogError::InvalidTimestamp(format!("{:?}: {}", s, e)))
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp(secs)
    }
}

fn whole_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(whole_secs(rhs)))
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_sub(whole_secs(rhs)))
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = i64;

    fn sub(self, rhs: Timestamp) -> i64 {
        self.duration_since(rhs)
    }
}
