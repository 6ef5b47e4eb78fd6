//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use slot_core::ReservationStartInterval;

/// Reservation slot checker.
///
/// Checks candidate reservations against existing ones, expands recurring
/// series and snaps reservation lengths to a unit's start interval.
#[derive(Debug, Parser)]
#[command(name = "slots", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check a candidate reservation against existing reservations.
    Check(CheckArgs),

    /// Expand a recurring series into individual reservations.
    Series(SeriesArgs),

    /// Show the minimum reservation and snap an end time to the unit's interval.
    Snap(SnapArgs),

    /// List selectable start times for a day.
    Starts(StartsArgs),

    /// Manage the selected reservation units.
    #[command(subcommand)]
    Select(SelectAction),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// JSON file with `reservations` and `affectingReservations`.
    #[arg(long)]
    pub reservations: PathBuf,

    /// Candidate start (RFC 3339 or YYYY-MM-DDTHH:MM).
    #[arg(long)]
    pub begin: String,

    /// Candidate end (RFC 3339 or YYYY-MM-DDTHH:MM).
    #[arg(long)]
    pub end: String,

    /// Candidate reservation type (e.g. NORMAL, BLOCKED).
    #[arg(long = "type", default_value = "NORMAL")]
    pub reservation_type: String,

    /// Skip the reservation with this pk (when moving it).
    #[arg(long)]
    pub ignore_pk: Option<i64>,

    /// JSON file with the reservation unit settings.
    #[arg(long)]
    pub unit: Option<PathBuf>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// First date of the series (YYYY-MM-DD).
    #[arg(long)]
    pub from: String,

    /// Last date of the series, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub to: String,

    /// Comma-separated weekdays (e.g. mon,wed,fri).
    #[arg(long, value_delimiter = ',', required = true)]
    pub weekday: Vec<String>,

    /// Daily start time (HH:MM).
    #[arg(long)]
    pub start: String,

    /// Daily end time (HH:MM).
    #[arg(long)]
    pub end: String,

    /// Repeat every other week.
    #[arg(long)]
    pub biweekly: bool,

    /// JSON file with existing reservations to mark overlaps against.
    #[arg(long)]
    pub reservations: Option<PathBuf>,

    /// Reservation type of the series.
    #[arg(long = "type", default_value = "NORMAL")]
    pub reservation_type: String,

    /// JSON file with the reservation unit settings.
    #[arg(long)]
    pub unit: Option<PathBuf>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SnapArgs {
    /// Reservation start (RFC 3339 or YYYY-MM-DDTHH:MM).
    #[arg(long)]
    pub begin: String,

    /// Requested end (RFC 3339 or YYYY-MM-DDTHH:MM).
    #[arg(long, conflicts_with = "duration")]
    pub end: Option<String>,

    /// Requested length (e.g. 90m, 1h30m, 45).
    #[arg(long)]
    pub duration: Option<String>,

    /// JSON file with the reservation unit settings.
    #[arg(long)]
    pub unit: Option<PathBuf>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct StartsArgs {
    /// Opening time (HH:MM).
    #[arg(long)]
    pub open: String,

    /// Closing time (HH:MM).
    #[arg(long)]
    pub close: String,

    /// JSON file with the reservation unit settings.
    #[arg(long)]
    pub unit: Option<PathBuf>,

    /// Start interval override (e.g. 30 or INTERVAL_30_MINS).
    #[arg(long)]
    pub interval: Option<ReservationStartInterval>,
}

/// Actions on the selected-units list.
#[derive(Debug, Subcommand)]
pub enum SelectAction {
    /// Add a unit to the selection.
    Add {
        /// Reservation unit pk.
        pk: i64,
    },
    /// Remove a unit from the selection.
    Remove {
        /// Reservation unit pk.
        pk: i64,
    },
    /// List selected units.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Clear the selection.
    Clear,
}
