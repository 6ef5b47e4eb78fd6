//! Recurring reservation series.
//!
//! A series is described by a date range, a set of weekdays, a daily time
//! window and a cadence. Expanding it yields one [`Occurrence`] per matching
//! date, which the UI can then annotate (removed by the user, overlapping an
//! existing reservation) before submitting what remains.
//!
//! # Biweekly cadence
//!
//! Weeks are Monday-anchored and counted from the week containing
//! `start_date` (week 0). A biweekly series keeps weeks 0, 2, 4, ... even when
//! `start_date` falls mid-week.

use std::collections::HashSet;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::collision::collides_with_any;
use crate::range::{BufferedInterval, Buffers, TimeRange};
use crate::reservation::ReservationInterval;
use crate::reservation_type::ReservationType;
use crate::types::ValidationError;

/// How often matching weekdays repeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    #[default]
    Weekly,
    Biweekly,
}

impl Cadence {
    /// Number of weeks between included weeks.
    pub const fn week_step(self) -> i64 {
        match self {
            Self::Weekly => 1,
            Self::Biweekly => 2,
        }
    }
}

/// The form state describing a recurring series.
///
/// Fields are public so a form can hold intermediate invalid values;
/// [`generate_reservations`] returns nothing for an invalid pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePattern {
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub weekdays: HashSet<Weekday>,
    pub daily_start: NaiveTime,
    pub daily_end: NaiveTime,
    pub cadence: Cadence,
}

impl RecurrencePattern {
    /// Creates a pattern, rejecting inverted dates or times and an empty weekday set.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        weekdays: impl IntoIterator<Item = Weekday>,
        daily_start: NaiveTime,
        daily_end: NaiveTime,
        cadence: Cadence,
    ) -> Result<Self, ValidationError> {
        let pattern = Self {
            start_date,
            end_date,
            weekdays: weekdays.into_iter().collect(),
            daily_start,
            daily_end,
            cadence,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_date > self.end_date {
            return Err(ValidationError::InvertedDates {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.daily_start >= self.daily_end {
            return Err(ValidationError::InvertedDailyTimes {
                start: self.daily_start,
                end: self.daily_end,
            });
        }
        if self.weekdays.is_empty() {
            return Err(ValidationError::NoWeekdays);
        }
        Ok(())
    }

    /// Whether `date` lies in an included week for this cadence.
    fn in_cadence(&self, date: NaiveDate) -> bool {
        let weeks = (week_start(date) - week_start(self.start_date)).num_days() / 7;
        weeks % self.cadence.week_step() == 0
    }
}

/// One generated reservation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub range: TimeRange,
    /// Discarded by the user.
    pub removed: bool,
    /// Collides with an existing reservation.
    pub overlapping: bool,
}

impl Occurrence {
    pub const fn new(date: NaiveDate, range: TimeRange) -> Self {
        Self {
            date,
            range,
            removed: false,
            overlapping: false,
        }
    }

    pub const fn remove(&mut self) {
        self.removed = true;
    }

    pub const fn restore(&mut self) {
        self.removed = false;
    }

    /// Neither removed nor overlapping, i.e. would be submitted.
    pub const fn is_active(&self) -> bool {
        !self.removed && !self.overlapping
    }
}

/// Expands a pattern into its occurrences, ascending by date.
///
/// Wall-clock times are resolved in `tz`. A time that falls in a DST gap drops
/// that date; an ambiguous time takes the earlier instant.
pub fn generate_reservations<Tz: TimeZone>(
    pattern: &RecurrencePattern,
    tz: &Tz,
) -> Vec<Occurrence> {
    if let Err(e) = pattern.validate() {
        debug!(error = %e, "invalid recurrence pattern, nothing generated");
        return Vec::new();
    }

    let mut occurrences = Vec::new();
    for date in pattern
        .start_date
        .iter_days()
        .take_while(|d| *d <= pattern.end_date)
    {
        if !pattern.weekdays.contains(&date.weekday()) || !pattern.in_cadence(date) {
            continue;
        }
        let range = local_to_utc(date, pattern.daily_start, tz)
            .zip(local_to_utc(date, pattern.daily_end, tz))
            .and_then(|(start, end)| TimeRange::new(start, end).ok());
        match range {
            Some(range) => occurrences.push(Occurrence::new(date, range)),
            None => trace!(%date, "daily window does not exist on this date, skipped"),
        }
    }

    debug!(count = occurrences.len(), "generated series occurrences");
    occurrences
}

/// Flags every occurrence that collides with an existing reservation.
///
/// `existing` should be mapped with the same `candidate_type` (see
/// [`crate::reservation_to_interval`]). Candidate buffers are dropped for a
/// blocked candidate. Flags are recomputed, so calling this again after the
/// existing list changes clears stale ones.
pub fn mark_overlapping(
    occurrences: &mut [Occurrence],
    existing: &[ReservationInterval],
    candidate_buffers: Buffers,
    candidate_type: ReservationType,
) {
    let buffers = if candidate_type.is_blocked() {
        Buffers::ZERO
    } else {
        candidate_buffers
    };
    for occurrence in occurrences {
        let candidate = BufferedInterval::new(occurrence.range, buffers);
        occurrence.overlapping = collides_with_any(&candidate, existing, None);
    }
}

/// Occurrences that would actually be submitted.
pub fn active_occurrences(occurrences: &[Occurrence]) -> Vec<Occurrence> {
    occurrences.iter().copied().filter(Occurrence::is_active).collect()
}

/// Monday of the week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn local_to_utc<Tz: TimeZone>(date: NaiveDate, time: NaiveTime, tz: &Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        // Ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}
