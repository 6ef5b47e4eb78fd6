//! Starts command for listing the selectable start times of a day.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveTime;
use slot_core::day_start_times;

use super::util::{load_unit, parse_time};
use crate::cli::StartsArgs;
use crate::config::Config;

/// Formats start times in rows of eight.
pub fn format_starts(times: &[NaiveTime]) -> String {
    let mut output = String::new();

    if times.is_empty() {
        writeln!(output, "No start times fit between opening and closing.").unwrap();
        return output;
    }

    for row in times.chunks(8) {
        let cells: Vec<String> = row.iter().map(|t| t.format("%H:%M").to_string()).collect();
        writeln!(output, "{}", cells.join("  ")).unwrap();
    }
    output
}

/// Runs the starts command.
pub fn run(args: &StartsArgs, config: &Config) -> Result<()> {
    let unit = load_unit(args.unit.as_deref(), &config.unit)?;
    let interval = args.interval.unwrap_or(unit.reservation_start_interval);
    let times = day_start_times(
        parse_time(&args.open)?,
        parse_time(&args.close)?,
        interval.duration(),
    );
    print!("{}", format_starts(&times));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use insta::assert_snapshot;

    fn time(s: &str) -> NaiveTime {
        parse_time(s).unwrap()
    }

    #[test]
    fn test_starts_wrap_rows() {
        let times = day_start_times(time("08:00"), time("13:00"), Duration::minutes(30));
        assert_snapshot!(format_starts(&times), @r"
        08:00  08:30  09:00  09:30  10:00  10:30  11:00  11:30
        12:00  12:30
        ");
    }

    #[test]
    fn test_starts_none_fit() {
        let times = day_start_times(time("08:00"), time("08:45"), Duration::minutes(60));
        assert_snapshot!(format_starts(&times), @"No start times fit between opening and closing.");
    }
}
