//! Snap command for fitting a reservation to a unit's limits.
//!
//! This module implements `slots snap` which shows the shortest reservation
//! a unit allows from a start time and, given a requested end, where that end
//! snaps to on the unit's start interval.

use std::fmt::{self, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use slot_core::{ReservationUnitConfig, TimeRange, get_valid_ending_time};

use super::util::{format_duration, format_range, load_unit, parse_duration, parse_timestamp};
use crate::cli::SnapArgs;
use crate::config::Config;

/// What the unit makes of a reservation starting at `begin`.
#[derive(Debug, Clone, Serialize)]
pub struct SnapReport {
    pub begin: DateTime<Utc>,
    pub start_interval_minutes: i64,
    /// Shortest legal reservation from `begin`.
    pub minimum: Option<TimeRange>,
    pub requested: Option<TimeRange>,
    /// Requested end floored to whole start intervals.
    pub valid_end: Option<DateTime<Utc>>,
    /// Requested range pulled within the unit's duration limits.
    pub normalized: Option<TimeRange>,
    pub violation: Option<String>,
}

/// Computes the snap report for `begin` and an optional requested range.
pub fn snap<Tz: TimeZone>(
    begin: DateTime<Utc>,
    requested: Option<TimeRange>,
    unit: &ReservationUnitConfig,
    tz: &Tz,
) -> SnapReport {
    let constraint = unit.constraint();

    SnapReport {
        begin,
        start_interval_minutes: unit.reservation_start_interval.minutes(),
        minimum: constraint.min_reservation(begin),
        requested,
        valid_end: requested
            .and_then(|r| get_valid_ending_time(r.start(), r.end(), constraint.start_granularity)),
        normalized: requested.and_then(|r| constraint.normalize(&r)),
        violation: requested
            .and_then(|r| constraint.validate(&r, tz).err())
            .map(|v| v.to_string()),
    }
}

/// Formats a snap report for terminal display.
pub fn format_snap<Tz: TimeZone>(
    report: &SnapReport,
    unit: &ReservationUnitConfig,
    tz: &Tz,
) -> String
where
    Tz::Offset: fmt::Display,
{
    let mut output = String::new();
    let constraint = unit.constraint();
    let line = |output: &mut String, label: &str, value: &str| {
        writeln!(output, "{label:<11} {value}").unwrap();
    };

    let min = if constraint.min_duration.is_zero() {
        "none".to_string()
    } else {
        format_duration(constraint.min_duration)
    };
    let max = constraint
        .max_duration
        .map_or_else(|| "none".to_string(), format_duration);
    line(
        &mut output,
        "UNIT",
        &format!(
            "{} min start interval, min {min}, max {max}",
            report.start_interval_minutes
        ),
    );
    writeln!(output).unwrap();

    let minimum = report
        .minimum
        .map_or_else(|| "none".to_string(), |r| format_range(&r, tz));
    line(&mut output, "MINIMUM", &minimum);

    if let Some(requested) = &report.requested {
        line(&mut output, "REQUESTED", &format_range(requested, tz));
        if let Some(violation) = &report.violation {
            line(&mut output, "INVALID", violation);
        }
        if let Some(end) = report.valid_end {
            let end = end.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string();
            line(&mut output, "VALID END", &end);
        }
        let normalized = report.normalized.map_or_else(
            || "none (no whole-interval length fits the limits)".to_string(),
            |r| format_range(&r, tz),
        );
        line(&mut output, "NORMALIZED", &normalized);
    }

    output
}

/// Runs the snap command.
pub fn run<Tz: TimeZone>(args: &SnapArgs, config: &Config, tz: &Tz) -> Result<()>
where
    Tz::Offset: fmt::Display,
{
    let unit = load_unit(args.unit.as_deref(), &config.unit)?;
    let begin = parse_timestamp(&args.begin, tz)?;

    let end = match (&args.end, &args.duration) {
        (Some(end), _) => Some(parse_timestamp(end, tz)?),
        (None, Some(duration)) => Some(
            begin
                .checked_add_signed(parse_duration(duration)?)
                .context("requested end is out of range")?,
        ),
        (None, None) => None,
    };
    let requested = end
        .map(|end| TimeRange::new(begin, end))
        .transpose()
        .context("requested end must be after begin")?;

    let report = snap(begin, requested, &unit, tz);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_snap(&report, &unit, tz));
    }
    Ok(())
}
