//! Reservation slot checker CLI library.
//!
//! This crate provides the CLI interface for the slot engine in `slot-core`.

mod cli;
pub mod commands;
mod config;
mod store;

pub use cli::{CheckArgs, Cli, Commands, SelectAction, SeriesArgs, SnapArgs, StartsArgs};
pub use config::Config;
pub use store::SelectionStore;
