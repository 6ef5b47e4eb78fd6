use std::fmt;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use slot_cli::commands::{check, select, series, snap, starts};
use slot_cli::{Cli, Commands, Config};

/// Runs a command with wall-clock times read and printed in `tz`.
fn dispatch<Tz: TimeZone>(command: &Commands, config: &Config, tz: &Tz) -> Result<()>
where
    Tz::Offset: fmt::Display,
{
    match command {
        Commands::Check(args) => check::run(args, config, tz),
        Commands::Series(args) => series::run(args, config, tz),
        Commands::Snap(args) => snap::run(args, config, tz),
        Commands::Starts(args) => starts::run(args, config),
        Commands::Select(action) => select::run(action, config),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if config.utc {
        dispatch(command, &config, &Utc)
    } else {
        dispatch(command, &config, &Local)
    }
}
