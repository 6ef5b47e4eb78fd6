//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use slot_core::ReservationUnitConfig;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Read and print wall-clock times in UTC instead of the local timezone.
    pub utc: bool,

    /// Path to the selected-units file.
    pub selection_path: PathBuf,

    /// Unit settings used when a command gets no `--unit` file.
    pub unit: ReservationUnitConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("utc", &self.utc)
            .field("selection_path", &self.selection_path)
            .field(
                "start_interval",
                &self.unit.reservation_start_interval.as_str(),
            )
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        let state_dir = dirs_state_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            utc: false,
            selection_path: state_dir.join("selection.json"),
            unit: ReservationUnitConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SLOTS_*)
        figment = figment.merge(Env::prefixed("SLOTS_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for slots.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("slots"))
}

/// Returns the platform-specific state directory for slots.
///
/// On Linux: `~/.local/state/slots`
pub fn dirs_state_path() -> Option<PathBuf> {
    dirs::state_dir().map(|p| p.join("slots"))
}
