//! Check command for testing a candidate against existing reservations.
//!
//! This module implements `slots check` which merges a unit's reservations
//! with the ones affecting it and lists every reservation the candidate,
//! including buffers, would collide with.

use std::fmt::{self, Write};

use anyhow::Result;
use chrono::TimeZone;
use serde::Serialize;
use slot_core::{
    AffectingReservations, ReservationType, ReservationUnitConfig, TimeRange, candidate_interval,
    combine_affecting_reservations, find_collisions, reservations_to_intervals,
};

use super::util::{format_range, load_unit, parse_reservation_type, parse_timestamp, read_json};
use crate::cli::CheckArgs;
use crate::config::Config;

/// An existing reservation the candidate collides with.
#[derive(Debug, Clone, Serialize)]
pub struct CollisionEntry {
    pub pk: Option<i64>,
    #[serde(rename = "type")]
    pub reservation_type: ReservationType,
    pub range: TimeRange,
}

/// Result of checking one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub candidate: TimeRange,
    /// The candidate widened by its buffers.
    pub occupied: TimeRange,
    #[serde(rename = "type")]
    pub reservation_type: ReservationType,
    /// Why the candidate is not reservable on the unit, if it is not.
    pub violation: Option<String>,
    /// Well-formed reservations checked against.
    pub considered: usize,
    /// Malformed reservations dropped before checking.
    pub skipped: usize,
    pub collisions: Vec<CollisionEntry>,
}

/// Checks `range` against the unit's reservations.
pub fn check_candidate<Tz: TimeZone>(
    raw: &AffectingReservations,
    unit: &ReservationUnitConfig,
    range: TimeRange,
    candidate_type: ReservationType,
    ignore_pk: Option<i64>,
    tz: &Tz,
) -> CheckReport {
    let records = combine_affecting_reservations(raw);
    let existing = reservations_to_intervals(&records, candidate_type);
    let candidate = candidate_interval(range, unit, candidate_type);

    let collisions = find_collisions(&candidate, &existing, ignore_pk)
        .into_iter()
        .map(|r| CollisionEntry {
            pk: r.pk,
            reservation_type: r.reservation_type,
            range: r.interval.range,
        })
        .collect();

    CheckReport {
        candidate: range,
        occupied: candidate.padded(),
        reservation_type: candidate_type,
        violation: unit
            .constraint()
            .validate(&range, tz)
            .err()
            .map(|v| v.to_string()),
        considered: existing.len(),
        skipped: records.len() - existing.len(),
        collisions,
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Formats a check report for terminal display.
pub fn format_check<Tz: TimeZone>(report: &CheckReport, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    let mut output = String::new();

    writeln!(
        output,
        "CANDIDATE  {} ({})",
        format_range(&report.candidate, tz),
        report.reservation_type
    )
    .unwrap();
    writeln!(output, "OCCUPIED   {}", format_range(&report.occupied, tz)).unwrap();
    if let Some(violation) = &report.violation {
        writeln!(output, "INVALID    {violation}").unwrap();
    }
    writeln!(output).unwrap();

    if report.collisions.is_empty() {
        writeln!(
            output,
            "No collisions among {}.",
            plural(report.considered, "reservation")
        )
        .unwrap();
    } else {
        writeln!(
            output,
            "{} among {}:",
            plural(report.collisions.len(), "collision"),
            plural(report.considered, "reservation")
        )
        .unwrap();
        for entry in &report.collisions {
            let pk = entry.pk.map_or_else(|| "-".to_string(), |pk| format!("#{pk}"));
            writeln!(
                output,
                "  {:<6} {:<9} {}",
                pk,
                entry.reservation_type.to_string(),
                format_range(&entry.range, tz)
            )
            .unwrap();
        }
    }

    if report.skipped > 0 {
        writeln!(output).unwrap();
        writeln!(
            output,
            "{} skipped.",
            plural(report.skipped, "malformed reservation")
        )
        .unwrap();
    }

    output
}

/// Runs the check command.
pub fn run<Tz: TimeZone>(args: &CheckArgs, config: &Config, tz: &Tz) -> Result<()>
where
    Tz::Offset: fmt::Display,
{
    let raw: AffectingReservations = read_json(&args.reservations)?;
    let unit = load_unit(args.unit.as_deref(), &config.unit)?;
    let range = TimeRange::new(
        parse_timestamp(&args.begin, tz)?,
        parse_timestamp(&args.end, tz)?,
    )?;
    let candidate_type = parse_reservation_type(&args.reservation_type)?;

    let report = check_candidate(&raw, &unit, range, candidate_type, args.ignore_pk, tz);
    tracing::debug!(
        collisions = report.collisions.len(),
        skipped = report.skipped,
        "checked candidate"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_check(&report, tz));
    }
    Ok(())
}
