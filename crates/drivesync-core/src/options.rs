//! Run options and their on-disk configuration form

use std::path::Path;

use drivesync_fs::{ConfigStore, WriteMode};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::Result;

/// Immutable configuration for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// If true, perform every read and decision but no mutation.
    /// Actions are logged prefixed with "[dry-run] Would ..."
    pub dry_run: bool,
    /// Exclusion globs, matched against basenames in this order.
    pub exclude: Vec<String>,
    /// Overwrite destination files directly instead of via temp + rename.
    pub write_in_place: bool,
    /// Number of `-v` flags; 0 is quiet.
    pub verbosity: u8,
}

impl SyncOptions {
    pub fn write_mode(&self) -> WriteMode {
        WriteMode::from_in_place(self.write_in_place)
    }

    /// Most detailed log level the run should emit.
    pub fn log_level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Sync settings as stored in a configuration file.
///
/// ```toml
/// exclude = ["*.tmp", ".DS_Store"]
/// in_place = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub dry_run: bool,
    pub exclude: Vec<String>,
    pub in_place: bool,
    pub verbosity: u8,
}

impl SyncConfig {
    /// Load from a TOML, JSON or YAML file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(?path, "Loading sync config");
        Ok(ConfigStore::new().load(path)?)
    }
}

impl From<SyncConfig> for SyncOptions {
    fn from(config: SyncConfig) -> Self {
        Self {
            dry_run: config.dry_run,
            exclude: config.exclude,
            write_in_place: config.in_place,
            verbosity: config.verbosity,
        }
    }
}
