//! # Node Configuration
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. command-line flags (and their `TRANSIT_*` environment fallbacks),
//! 2. the TOML config file,
//! 3. built-in defaults.
//!
//! ```toml
//! data_dir = "/var/lib/transit"
//! log_level = "transit_contracts=debug"
//! log_format = "json"
//!
//! # Replaces the standard tariff table when present.
//! [[tariff]]
//! origin = "amsterdam"
//! destination = "utrecht"
//! symmetric = true
//! split = { ns = 70, veolia = 30 }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use transit_contracts::{TariffRule, TariffTable};

use crate::logging::{LogFormat, DEFAULT_FILTER};

/// Data directory used when neither flag nor file names one.
pub const DEFAULT_DATA_DIR: &str = ".transit";

/// Name of the config file looked up inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Contents of a config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    #[serde(default)]
    pub tariff: Vec<TariffRule>,
}

impl NodeConfig {
    /// Parses TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid node configuration")
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Loads `explicit` if given, else `config.toml` under `data_dir` if it
    /// exists, else an empty config.
    pub fn discover(explicit: Option<&Path>, data_dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let implicit = data_dir.join(CONFIG_FILE_NAME);
        if implicit.is_file() {
            Self::load(&implicit)
        } else {
            Ok(Self::default())
        }
    }
}

/// Command-line values that override the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub log_format: Option<String>,
}

/// Effective node settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub log_format: LogFormat,
    pub tariff: TariffTable,
}

impl Settings {
    /// Merges flags over file over defaults.
    pub fn resolve(overrides: Overrides, file: NodeConfig) -> Self {
        let tariff = if file.tariff.is_empty() {
            TariffTable::standard()
        } else {
            TariffTable::new(file.tariff)
        };

        Self {
            data_dir: overrides
                .data_dir
                .or(file.data_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            log_level: file.log_level.unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            log_format: overrides
                .log_format
                .or(file.log_format)
                .map(|f| LogFormat::from_str_lossy(&f))
                .unwrap_or_default(),
            tariff,
        }
    }

    /// Location of the sled database.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger")
    }
}
