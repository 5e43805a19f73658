//! Configuration file loading and parsing.
//!
//! Settings come from `flowboard.toml`. Every section and key is optional;
//! if no config file exists, the system falls back to defaults.
//!
//! ```toml
//! [sync]
//! auto_recompute = true
//!
//! [palette.completed]
//! stroke = "#2e7d32"
//! fill = "#e8f5e9"
//! ```

use crate::errors::{BoardError, BoardResult};
use crate::status::{Colors, StatusPalette};
use serde::Deserialize;
use std::path::Path;

/// Default config file name looked up next to the snapshot.
pub const CONFIG_FILE_NAME: &str = "flowboard.toml";

/// Root configuration structure loaded from `flowboard.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    /// Status projection settings (optional).
    pub sync: Option<SyncConfig>,
    /// Element colour overrides (optional).
    pub palette: Option<PaletteConfig>,
}

/// Status projection settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Recompute element statuses after every issue mutation (default: true).
    pub auto_recompute: Option<bool>,
}

impl SyncConfig {
    pub fn auto_recompute(&self) -> bool {
        self.auto_recompute.unwrap_or(true)
    }
}

/// Per-status colour overrides. Missing entries keep the default colours.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaletteConfig {
    pub completed: Option<Colors>,
    pub in_progress: Option<Colors>,
    pub not_started: Option<Colors>,
}

impl PaletteConfig {
    /// Merge overrides onto the default palette.
    pub fn resolve(&self) -> StatusPalette {
        let defaults = StatusPalette::default();
        StatusPalette {
            completed: self.completed.clone().unwrap_or(defaults.completed),
            in_progress: self.in_progress.clone().unwrap_or(defaults.in_progress),
            not_started: self.not_started.clone().unwrap_or(defaults.not_started),
        }
    }
}

impl BoardConfig {
    /// Load configuration from a TOML file if it exists.
    ///
    /// Returns the default config if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> BoardResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| BoardError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| BoardError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn auto_recompute(&self) -> bool {
        self.sync
            .as_ref()
            .map(SyncConfig::auto_recompute)
            .unwrap_or(true)
    }

    pub fn palette(&self) -> StatusPalette {
        self.palette
            .as_ref()
            .map(PaletteConfig::resolve)
            .unwrap_or_default()
    }
}
