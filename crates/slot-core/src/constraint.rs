//! Duration bounds and start-time granularity of a reservation unit.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use thiserror::Error;

use crate::range::TimeRange;

/// Why a candidate range is not reservable on a unit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error("reservation must be at least {min_minutes} minutes long")]
    TooShort { min_minutes: i64 },

    #[error("reservation can be at most {max_minutes} minutes long")]
    TooLong { max_minutes: i64 },

    #[error("reservation must start on a {granularity_minutes} minute boundary")]
    StartNotAligned { granularity_minutes: i64 },

    #[error("reservation length must be a multiple of {granularity_minutes} minutes")]
    DurationNotAligned { granularity_minutes: i64 },
}

/// Scheduling limits for new reservations on a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalConstraint {
    pub min_duration: Duration,
    /// `None` means unbounded.
    pub max_duration: Option<Duration>,
    pub start_granularity: Duration,
}

impl IntervalConstraint {
    /// Shortest legal length: the configured minimum, but never below one granularity unit.
    pub fn effective_min(&self) -> Duration {
        self.min_duration.max(self.start_granularity)
    }

    /// Checks a candidate range against the unit's limits.
    ///
    /// Start alignment is measured from local midnight in `tz`. The first
    /// violation found is returned, checked in the order short, long, start, length.
    pub fn validate<Tz: TimeZone>(
        &self,
        range: &TimeRange,
        tz: &Tz,
    ) -> Result<(), ConstraintViolation> {
        let granularity_minutes = self.start_granularity.num_minutes();
        let duration = range.duration();

        if duration < self.effective_min() {
            return Err(ConstraintViolation::TooShort {
                min_minutes: self.effective_min().num_minutes(),
            });
        }
        if let Some(max) = self.max_duration.filter(|&max| duration > max) {
            return Err(ConstraintViolation::TooLong {
                max_minutes: max.num_minutes(),
            });
        }

        let Some(step) = step_millis(self.start_granularity) else {
            return Ok(());
        };
        let local_start = range.start().with_timezone(tz);
        let since_midnight = i64::from(local_start.num_seconds_from_midnight()) * 1000
            + i64::from(local_start.nanosecond() / 1_000_000);
        if since_midnight % step != 0 {
            return Err(ConstraintViolation::StartNotAligned {
                granularity_minutes,
            });
        }
        if duration.num_milliseconds() % step != 0 {
            return Err(ConstraintViolation::DurationNotAligned {
                granularity_minutes,
            });
        }
        Ok(())
    }

    pub fn is_valid<Tz: TimeZone>(&self, range: &TimeRange, tz: &Tz) -> bool {
        self.validate(range, tz).is_ok()
    }

    /// The shortest legal reservation starting at `begin`.
    pub fn min_reservation(&self, begin: DateTime<Utc>) -> Option<TimeRange> {
        get_min_reservation(begin, self.start_granularity, self.min_duration)
    }

    /// Pulls a candidate's length into the legal range.
    ///
    /// The end is floored to the granularity, then raised to the minimum or
    /// lowered to the maximum (both rounded to whole units). The start is kept.
    /// Returns `None` if no whole-unit length satisfies both bounds.
    pub fn normalize(&self, range: &TimeRange) -> Option<TimeRange> {
        let step = step_millis(self.start_granularity)?;
        let min = ceil_to(self.effective_min().num_milliseconds(), step)?;
        let max = self
            .max_duration
            .map(|m| m.num_milliseconds() - m.num_milliseconds() % step);
        if max.is_some_and(|max| max < min) {
            return None;
        }

        let floored = range.duration().num_milliseconds() / step * step;
        let mut length = floored.max(min);
        if let Some(max) = max {
            length = length.min(max);
        }
        TimeRange::starting_at(range.start(), Duration::try_milliseconds(length)?).ok()
    }
}

/// Snaps `end` down so that `end - start` is a whole number of granularity units.
///
/// Never moves past the requested end; an exact multiple comes back unchanged.
/// Returns `None` for a non-positive granularity or an end before the start.
/// A request shorter than one unit snaps to `start` itself.
pub fn get_valid_ending_time(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Duration,
) -> Option<DateTime<Utc>> {
    let step = step_millis(granularity)?;
    if end < start {
        return None;
    }
    let units = (end - start).num_milliseconds() / step;
    start.checked_add_signed(Duration::milliseconds(units * step))
}

/// The shortest legal reservation starting at `begin`.
///
/// Its length is `max(min_duration, granularity)`, so a unit with no minimum
/// still yields one full granularity unit. `None` only when both are non-positive.
pub fn get_min_reservation(
    begin: DateTime<Utc>,
    granularity: Duration,
    min_duration: Duration,
) -> Option<TimeRange> {
    TimeRange::starting_at(begin, min_duration.max(granularity)).ok()
}

/// Selectable start times between opening and closing, one granularity apart.
///
/// Each returned time leaves room for at least one unit before `close`.
pub fn day_start_times(open: NaiveTime, close: NaiveTime, granularity: Duration) -> Vec<NaiveTime> {
    let mut times = Vec::new();
    if granularity <= Duration::zero() || open >= close {
        return times;
    }

    let mut current = open;
    loop {
        let (next, wrapped) = current.overflowing_add_signed(granularity);
        if wrapped != 0 || next > close {
            break;
        }
        times.push(current);
        current = next;
    }
    times
}

fn step_millis(granularity: Duration) -> Option<i64> {
    Some(granularity.num_milliseconds()).filter(|&ms| ms > 0)
}

/// Rounds `value` up to a multiple of `step`. `None` on overflow.
fn ceil_to(value: i64, step: i64) -> Option<i64> {
    let rem = value % step;
    if rem == 0 {
        Some(value)
    } else {
        value.checked_add(step - rem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn constraint(min: i64, max: Option<i64>, granularity: i64) -> IntervalConstraint {
        IntervalConstraint {
            min_duration: Duration::minutes(min),
            max_duration: max.map(Duration::minutes),
            start_granularity: Duration::minutes(granularity),
        }
    }

    #[test]
    fn valid_ending_time_floors_to_granularity() {
        let start = at(10, 0);
        let end = start + Duration::minutes(95);
        assert_eq!(
            get_valid_ending_time(start, end, Duration::minutes(30)),
            Some(start + Duration::minutes(90))
        );
    }

    #[test]
    fn valid_ending_time_keeps_exact_multiple() {
        let start = at(10, 0);
        let end = start + Duration::minutes(120);
        assert_eq!(
            get_valid_ending_time(start, end, Duration::minutes(30)),
            Some(end)
        );
    }

    #[test]
    fn valid_ending_time_measures_from_start_not_clock() {
        // Start off the hour: units count from 10:10, not from 10:00.
        let start = at(10, 10);
        let end = at(11, 0);
        assert_eq!(
            get_valid_ending_time(start, end, Duration::minutes(15)),
            Some(at(10, 55))
        );
    }

    #[test]
    fn valid_ending_time_rejects_bad_input() {
        let start = at(10, 0);
        assert_eq!(get_valid_ending_time(start, at(9, 0), Duration::minutes(15)), None);
        assert_eq!(get_valid_ending_time(start, at(11, 0), Duration::zero()), None);
        assert_eq!(
            get_valid_ending_time(start, at(11, 0), Duration::minutes(-15)),
            None
        );
        // Shorter than one unit collapses to the start.
        assert_eq!(
            get_valid_ending_time(start, at(10, 10), Duration::minutes(15)),
            Some(start)
        );
    }

    #[test]
    fn min_reservation_never_shorter_than_granularity() {
        let begin = at(10, 0);
        let r = get_min_reservation(begin, Duration::minutes(15), Duration::zero()).unwrap();
        assert_eq!(r.start(), begin);
        assert_eq!(r.end(), begin + Duration::minutes(15));
    }

    #[test]
    fn min_reservation_uses_longer_minimum() {
        let begin = at(10, 0);
        let r = get_min_reservation(begin, Duration::minutes(15), Duration::hours(2)).unwrap();
        assert_eq!(r.end(), at(12, 0));
    }

    #[test]
    fn min_reservation_none_when_both_zero() {
        assert!(get_min_reservation(at(10, 0), Duration::zero(), Duration::zero()).is_none());
    }

    #[test]
    fn validate_accepts_aligned_range() {
        let c = constraint(60, Some(180), 30);
        let r = TimeRange::new(at(10, 30), at(12, 0)).unwrap();
        assert_eq!(c.validate(&r, &Utc), Ok(()));
        assert!(c.is_valid(&r, &Utc));
    }

    #[test]
    fn validate_reports_each_violation() {
        let c = constraint(60, Some(180), 30);

        let short = TimeRange::new(at(10, 0), at(10, 30)).unwrap();
        assert_eq!(
            c.validate(&short, &Utc),
            Err(ConstraintViolation::TooShort { min_minutes: 60 })
        );

        let long = TimeRange::new(at(8, 0), at(12, 0)).unwrap();
        assert_eq!(
            c.validate(&long, &Utc),
            Err(ConstraintViolation::TooLong { max_minutes: 180 })
        );

        let misaligned = TimeRange::new(at(10, 15), at(11, 15)).unwrap();
        assert_eq!(
            c.validate(&misaligned, &Utc),
            Err(ConstraintViolation::StartNotAligned {
                granularity_minutes: 30
            })
        );

        let odd_length = TimeRange::new(at(10, 0), at(11, 15)).unwrap();
        assert_eq!(
            c.validate(&odd_length, &Utc),
            Err(ConstraintViolation::DurationNotAligned {
                granularity_minutes: 30
            })
        );
    }

    #[test]
    fn validate_alignment_uses_local_midnight() {
        // Two hour slots: 10:00 UTC is on a boundary, 13:00 at +03:00 is not.
        let c = constraint(0, None, 120);
        let r = TimeRange::new(at(10, 0), at(12, 0)).unwrap();
        assert!(c.is_valid(&r, &Utc));

        let helsinki_summer = FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(
            c.validate(&r, &helsinki_summer),
            Err(ConstraintViolation::StartNotAligned {
                granularity_minutes: 120
            })
        );
    }

    #[test]
    fn min_below_granularity_is_raised() {
        let c = constraint(0, None, 15);
        let r = TimeRange::new(at(10, 0), at(10, 10)).unwrap();
        assert_eq!(
            c.validate(&r, &Utc),
            Err(ConstraintViolation::TooShort { min_minutes: 15 })
        );
        assert_eq!(c.min_reservation(at(10, 0)).unwrap().end(), at(10, 15));
    }

    #[test]
    fn normalize_floors_and_clamps() {
        let c = constraint(60, Some(140), 30);

        let long_odd = TimeRange::new(at(10, 0), at(13, 5)).unwrap();
        let n = c.normalize(&long_odd).unwrap();
        // A 140 minute maximum leaves four whole units.
        assert_eq!(n.end(), at(12, 0));

        let short = TimeRange::new(at(10, 0), at(10, 20)).unwrap();
        assert_eq!(c.normalize(&short).unwrap().end(), at(11, 0));

        let fine = TimeRange::new(at(10, 0), at(11, 40)).unwrap();
        assert_eq!(c.normalize(&fine).unwrap().end(), at(11, 30));
    }

    #[test]
    fn normalize_rounds_minimum_up_to_whole_units() {
        let c = constraint(45, None, 30);
        let r = TimeRange::new(at(10, 0), at(10, 30)).unwrap();
        assert_eq!(c.normalize(&r).unwrap().end(), at(11, 0));
    }

    #[test]
    fn normalize_none_when_minimum_cannot_be_rounded() {
        let c = IntervalConstraint {
            min_duration: Duration::MAX,
            max_duration: None,
            start_granularity: Duration::minutes(90),
        };
        let range = TimeRange::new(at(10, 0), at(11, 0)).unwrap();
        assert_eq!(c.normalize(&range), None);
        assert_eq!(
            c.validate(&range, &Utc),
            Err(ConstraintViolation::TooShort {
                min_minutes: Duration::MAX.num_minutes()
            })
        );
    }

    #[test]
    fn normalize_none_when_bounds_conflict() {
        let c = constraint(90, Some(100), 60);
        let r = TimeRange::new(at(10, 0), at(12, 0)).unwrap();
        assert!(c.normalize(&r).is_none());
    }

    #[test]
    fn day_start_times_fit_before_close() {
        let times = day_start_times(time(9, 0), time(11, 0), Duration::minutes(30));
        assert_eq!(
            times,
            vec![time(9, 0), time(9, 30), time(10, 0), time(10, 30)]
        );
    }

    #[test]
    fn day_start_times_partial_last_unit_is_dropped() {
        let times = day_start_times(time(9, 0), time(10, 45), Duration::minutes(60));
        assert_eq!(times, vec![time(9, 0)]);
    }

    #[test]
    fn day_start_times_stop_at_midnight() {
        let times = day_start_times(time(22, 0), time(23, 59), Duration::minutes(60));
        assert_eq!(times, vec![time(22, 0)]);
    }

    #[test]
    fn day_start_times_empty_for_bad_input() {
        assert!(day_start_times(time(12, 0), time(9, 0), Duration::minutes(15)).is_empty());
        assert!(day_start_times(time(9, 0), time(12, 0), Duration::zero()).is_empty());
    }
}
