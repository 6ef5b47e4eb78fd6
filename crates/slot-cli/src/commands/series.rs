//! Series command for expanding recurring reservations.
//!
//! This module implements `slots series` which lists every reservation a
//! recurring pattern produces, flagging those that overlap existing ones.

use std::fmt::{self, Write};

use anyhow::Result;
use chrono::{TimeZone, Weekday};
use serde::Serialize;
use slot_core::{
    AffectingReservations, Cadence, Occurrence, RecurrencePattern, ReservationType,
    ReservationUnitConfig, active_occurrences, combine_affecting_reservations,
    generate_reservations, mark_overlapping, reservations_to_intervals,
};

use super::util::{
    load_unit, parse_date, parse_reservation_type, parse_time, parse_weekdays, read_json,
};
use crate::cli::SeriesArgs;
use crate::config::Config;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// JSON output for the series command.
#[derive(Debug, Serialize)]
struct SeriesOutput<'a> {
    cadence: Cadence,
    total: usize,
    active: usize,
    occurrences: &'a [Occurrence],
}

/// Builds a pattern from command-line arguments.
pub fn build_pattern(args: &SeriesArgs) -> Result<RecurrencePattern> {
    let cadence = if args.biweekly {
        Cadence::Biweekly
    } else {
        Cadence::Weekly
    };
    let pattern = RecurrencePattern::new(
        parse_date(&args.from)?,
        parse_date(&args.to)?,
        parse_weekdays(&args.weekday)?,
        parse_time(&args.start)?,
        parse_time(&args.end)?,
        cadence,
    )?;
    Ok(pattern)
}

/// Generates the occurrences, marking overlaps when existing reservations are given.
pub fn expand_series<Tz: TimeZone>(
    pattern: &RecurrencePattern,
    existing: Option<&AffectingReservations>,
    unit: &ReservationUnitConfig,
    candidate_type: ReservationType,
    tz: &Tz,
) -> Vec<Occurrence> {
    let mut occurrences = generate_reservations(pattern, tz);
    if let Some(raw) = existing {
        let records = combine_affecting_reservations(raw);
        let intervals = reservations_to_intervals(&records, candidate_type);
        mark_overlapping(&mut occurrences, &intervals, unit.buffers(), candidate_type);
    }
    occurrences
}

/// Formats the series for terminal display.
pub fn format_series<Tz: TimeZone>(
    pattern: &RecurrencePattern,
    occurrences: &[Occurrence],
    tz: &Tz,
) -> String
where
    Tz::Offset: fmt::Display,
{
    let mut output = String::new();

    let days: Vec<String> = WEEK
        .iter()
        .filter(|d| pattern.weekdays.contains(*d))
        .map(ToString::to_string)
        .collect();
    let cadence = match pattern.cadence {
        Cadence::Weekly => "weekly",
        Cadence::Biweekly => "every other week",
    };
    writeln!(
        output,
        "SERIES  {} to {}, {} on {}, {} - {}",
        pattern.start_date,
        pattern.end_date,
        cadence,
        days.join(", "),
        pattern.daily_start.format("%H:%M"),
        pattern.daily_end.format("%H:%M")
    )
    .unwrap();
    writeln!(output).unwrap();

    if occurrences.is_empty() {
        writeln!(output, "No dates match the pattern.").unwrap();
        return output;
    }

    for occurrence in occurrences {
        let start = occurrence.range.start().with_timezone(tz);
        let end = occurrence.range.end().with_timezone(tz);
        let mut line = format!(
            "  {}  {} - {}",
            occurrence.date.format("%a %Y-%m-%d"),
            start.format("%H:%M"),
            end.format("%H:%M")
        );
        if occurrence.removed {
            line.push_str("  removed");
        }
        if occurrence.overlapping {
            line.push_str("  overlapping");
        }
        writeln!(output, "{line}").unwrap();
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "{} occurrences, {} to reserve.",
        occurrences.len(),
        active_occurrences(occurrences).len()
    )
    .unwrap();

    output
}

/// Runs the series command.
pub fn run<Tz: TimeZone>(args: &SeriesArgs, config: &Config, tz: &Tz) -> Result<()>
where
    Tz::Offset: fmt::Display,
{
    let pattern = build_pattern(args)?;
    let unit = load_unit(args.unit.as_deref(), &config.unit)?;
    let candidate_type = parse_reservation_type(&args.reservation_type)?;
    let existing: Option<AffectingReservations> =
        args.reservations.as_deref().map(read_json).transpose()?;

    let occurrences = expand_series(&pattern, existing.as_ref(), &unit, candidate_type, tz);

    if args.json {
        let out = SeriesOutput {
            cadence: pattern.cadence,
            total: occurrences.len(),
            active: active_occurrences(&occurrences).len(),
            occurrences: &occurrences,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", format_series(&pattern, &occurrences, tz));
    }
    Ok(())
}
