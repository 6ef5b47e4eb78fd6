//! CLI subcommand implementations.

pub mod check;
pub mod select;
pub mod series;
pub mod snap;
pub mod starts;
mod util;
