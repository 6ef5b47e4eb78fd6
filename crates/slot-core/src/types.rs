//! Core type definitions with validation.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core value types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A time range whose end is not after its start.
    #[error("time range must end after it starts ({start} >= {end})")]
    EmptyRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A recurrence whose end date precedes its start date.
    #[error("series end date {end} is before start date {start}")]
    InvertedDates { start: NaiveDate, end: NaiveDate },

    /// A recurrence whose daily end time is not after its daily start time.
    #[error("daily end time {end} must be after daily start time {start}")]
    InvertedDailyTimes { start: NaiveTime, end: NaiveTime },

    /// A recurrence without any weekday selected.
    #[error("at least one weekday must be selected")]
    NoWeekdays,

    /// Invalid start interval value.
    #[error("invalid reservation start interval: {value}")]
    InvalidStartInterval { value: String },
}

/// Granularity at which reservations on a unit may start.
///
/// Serialized with the API's enum names (e.g. `INTERVAL_30_MINS`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ReservationStartInterval {
    #[default]
    #[serde(rename = "INTERVAL_15_MINS")]
    Mins15,
    #[serde(rename = "INTERVAL_30_MINS")]
    Mins30,
    #[serde(rename = "INTERVAL_60_MINS")]
    Mins60,
    #[serde(rename = "INTERVAL_90_MINS")]
    Mins90,
    #[serde(rename = "INTERVAL_120_MINS")]
    Mins120,
    #[serde(rename = "INTERVAL_180_MINS")]
    Mins180,
    #[serde(rename = "INTERVAL_240_MINS")]
    Mins240,
    #[serde(rename = "INTERVAL_300_MINS")]
    Mins300,
    #[serde(rename = "INTERVAL_360_MINS")]
    Mins360,
    #[serde(rename = "INTERVAL_420_MINS")]
    Mins420,
}

impl ReservationStartInterval {
    /// Every interval, shortest first.
    pub const ALL: [Self; 10] = [
        Self::Mins15,
        Self::Mins30,
        Self::Mins60,
        Self::Mins90,
        Self::Mins120,
        Self::Mins180,
        Self::Mins240,
        Self::Mins300,
        Self::Mins360,
        Self::Mins420,
    ];

    /// Length of the interval in minutes.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        match self {
            Self::Mins15 => 15,
            Self::Mins30 => 30,
            Self::Mins60 => 60,
            Self::Mins90 => 90,
            Self::Mins120 => 120,
            Self::Mins180 => 180,
            Self::Mins240 => 240,
            Self::Mins300 => 300,
            Self::Mins360 => 360,
            Self::Mins420 => 420,
        }
    }

    /// Length of the interval as a duration.
    #[must_use]
    pub const fn duration(self) -> Duration {
        Duration::minutes(self.minutes())
    }

    /// API string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mins15 => "INTERVAL_15_MINS",
            Self::Mins30 => "INTERVAL_30_MINS",
            Self::Mins60 => "INTERVAL_60_MINS",
            Self::Mins90 => "INTERVAL_90_MINS",
            Self::Mins120 => "INTERVAL_120_MINS",
            Self::Mins180 => "INTERVAL_180_MINS",
            Self::Mins240 => "INTERVAL_240_MINS",
            Self::Mins300 => "INTERVAL_300_MINS",
            Self::Mins360 => "INTERVAL_360_MINS",
            Self::Mins420 => "INTERVAL_420_MINS",
        }
    }

    /// Looks up the interval with exactly this many minutes.
    pub fn from_minutes(minutes: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.minutes() == minutes)
    }
}

impl fmt::Display for ReservationStartInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReservationStartInterval {
    type Err = ValidationError;

    /// Accepts the API name (`INTERVAL_30_MINS`) or a bare minute count (`30`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(found) = Self::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(trimmed))
        {
            return Ok(found);
        }
        trimmed
            .parse::<i64>()
            .ok()
            .and_then(Self::from_minutes)
            .ok_or_else(|| ValidationError::InvalidStartInterval {
                value: s.to_string(),
            })
    }
}
