//! Time ranges and the buffer padding applied around reservations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawTimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = ValidationError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeRange {
    /// Creates a range, rejecting empty and inverted ones.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a range starting at `start` and lasting `duration`.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Result<Self, ValidationError> {
        let end = start.checked_add_signed(duration).unwrap_or(start);
        Self::new(start, end)
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap test; touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Padding kept free before and after a reservation (e.g. cleaning time).
///
/// Negative values are clamped to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Buffers {
    before: Duration,
    after: Duration,
}

impl Buffers {
    pub const ZERO: Self = Self {
        before: Duration::zero(),
        after: Duration::zero(),
    };

    pub fn new(before: Duration, after: Duration) -> Self {
        Self {
            before: before.max(Duration::zero()),
            after: after.max(Duration::zero()),
        }
    }

    /// Builds buffers from the API's optional second counts.
    ///
    /// Returns `None` if either count is too large for a `Duration`.
    pub fn from_seconds(before: Option<i64>, after: Option<i64>) -> Option<Self> {
        Some(Self::new(
            Duration::try_seconds(before.unwrap_or(0))?,
            Duration::try_seconds(after.unwrap_or(0))?,
        ))
    }

    pub const fn before(&self) -> Duration {
        self.before
    }

    pub const fn after(&self) -> Duration {
        self.after
    }

    pub fn is_zero(&self) -> bool {
        self.before.is_zero() && self.after.is_zero()
    }
}

/// A reservation's range together with the buffers used for collision checks.
///
/// The buffers never move the reservation's own start and end; they only widen
/// the span considered occupied (see [`BufferedInterval::padded`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferedInterval {
    pub range: TimeRange,
    pub buffers: Buffers,
}

impl BufferedInterval {
    pub const fn new(range: TimeRange, buffers: Buffers) -> Self {
        Self { range, buffers }
    }

    /// The occupied span: start minus the before buffer, end plus the after buffer.
    ///
    /// Saturates at the representable bounds.
    pub fn padded(&self) -> TimeRange {
        let start = self
            .range
            .start
            .checked_sub_signed(self.buffers.before)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let end = self
            .range
            .end
            .checked_add_signed(self.buffers.after)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        // Padding only widens a valid range, so start < end still holds.
        TimeRange { start, end }
    }

    /// Same range with the buffers dropped.
    #[must_use]
    pub const fn without_buffers(self) -> Self {
        Self {
            range: self.range,
            buffers: Buffers::ZERO,
        }
    }
}

impl From<TimeRange> for BufferedInterval {
    fn from(range: TimeRange) -> Self {
        Self::new(range, Buffers::ZERO)
    }
}
