//! Shared utilities for CLI commands.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use slot_core::{ReservationType, ReservationUnitConfig, TimeRange};

/// Pre-compiled regex for durations like "1h30m", "90m", "2h".
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+)h)?\s*(?:(\d+)m)?$").unwrap());

/// Upper bound for parsed durations (one year in minutes).
const MAX_DURATION_MINUTES: i64 = 366 * 24 * 60;

const WALL_CLOCK_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parse a duration string.
///
/// Supports:
/// - Hours and minutes: "1h30m", "1h", "90m"
/// - Bare minutes: "45"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let minutes = if let Ok(n) = s.parse::<i64>() {
        n
    } else {
        let caps = DURATION_RE
            .captures(s)
            .filter(|c| c.get(1).is_some() || c.get(2).is_some())
            .with_context(|| {
                format!("Invalid duration: {s}. Use e.g. '90m', '1h30m' or a number of minutes")
            })?;
        let part = |i: usize| -> Result<i64> {
            caps.get(i)
                .map_or(Ok(0), |m| m.as_str().parse())
                .context("failed to parse number in duration")
        };
        let (hours, mins) = (part(1)?, part(2)?);
        hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(mins))
            .context("duration too large")?
    };

    if !(0..=MAX_DURATION_MINUTES).contains(&minutes) {
        anyhow::bail!("Duration out of range: {s}");
    }
    Ok(Duration::minutes(minutes))
}

/// Parse a timestamp as RFC 3339, or as wall-clock time in `tz`.
///
/// Wall-clock input that falls in a DST gap is rejected; an ambiguous one
/// resolves to the earlier instant.
pub fn parse_timestamp<Tz: TimeZone>(s: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(naive) = WALL_CLOCK_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    else {
        anyhow::bail!(
            "Invalid timestamp: {s}. Use RFC 3339 (e.g., 2024-06-03T10:00:00Z) or local time (e.g., 2024-06-03T10:00)"
        );
    };

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => anyhow::bail!("{s} does not exist in the local timezone"),
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {s}. Use YYYY-MM-DD"))
}

pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").with_context(|| format!("Invalid time: {s}. Use HH:MM"))
}

/// Parse weekday names ("mon", "Tuesday", ...).
pub fn parse_weekdays(names: &[String]) -> Result<Vec<Weekday>> {
    names
        .iter()
        .map(|n| {
            n.trim()
                .parse::<Weekday>()
                .map_err(|_| anyhow::anyhow!("Invalid weekday: {n}"))
        })
        .collect()
}

pub fn parse_reservation_type(s: &str) -> Result<ReservationType> {
    s.parse::<ReservationType>().map_err(anyhow::Error::from)
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// The unit settings from `--unit` if given, otherwise the configured default.
pub fn load_unit(path: Option<&Path>, default: &ReservationUnitConfig) -> Result<ReservationUnitConfig> {
    path.map_or_else(|| Ok(default.clone()), read_json)
}

/// Formats a range in `tz`, omitting the end date when it matches the start date.
pub fn format_range<Tz: TimeZone>(range: &TimeRange, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    let start = range.start().with_timezone(tz);
    let end = range.end().with_timezone(tz);
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%H:%M"))
    } else {
        format!(
            "{} - {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Formats a duration as "Xh Ym" if >= 1 hour, "Xm" otherwise.
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
