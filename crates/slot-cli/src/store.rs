//! Selected reservation units.
//!
//! The selection is an ordered list of unit pks kept in `selection.json` in
//! the state directory, so it survives between invocations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free list of selected unit pks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionStore {
    #[serde(default)]
    units: Vec<i64>,
    #[serde(skip)]
    path: PathBuf,
}

impl SelectionStore {
    /// Loads the selection from `path`.
    ///
    /// A missing file is an empty selection.
    /// Returns an error if the file exists but is unreadable/unparseable.
    pub fn load(path: &Path) -> Result<Self> {
        let mut store = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<Self>(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        store.path = path.to_path_buf();
        Ok(store)
    }

    /// Writes the selection back to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("failed to create state directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize selection")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub fn units(&self) -> &[i64] {
        &self.units
    }

    pub fn contains(&self, pk: i64) -> bool {
        self.units.contains(&pk)
    }

    /// Appends `pk`. Returns false if it was already selected.
    pub fn add(&mut self, pk: i64) -> bool {
        if self.contains(pk) {
            return false;
        }
        self.units.push(pk);
        true
    }

    /// Removes `pk`. Returns false if it was not selected.
    pub fn remove(&mut self, pk: i64) -> bool {
        let before = self.units.len();
        self.units.retain(|&u| u != pk);
        self.units.len() != before
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }
}
