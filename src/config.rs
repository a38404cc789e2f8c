//! # Configuration Module
//!
//! ## Purpose
//! Holds the few settings the crate needs at startup: which element table feeds the
//! atom registry, the default number of kinetics sample points and the log level.
//!
//! ## Configuration Format
//! ```json
//! {
//!   "element_table": "elements.txt",
//!   "default_steps": 10,
//!   "log_level": "info"
//! }
//! ```
//! A missing `element_table` (or `null`) selects the built-in teaching table.
//!
//! ## Usage
//! ```rust
//! use chempkg::config::ChemConfig;
//!
//! let config = ChemConfig::load("chempkg_config.json").unwrap();
//! assert!(config.default_steps > 0);
//! ```
use crate::Chemistry::errors::ChemError;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "chempkg_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemConfig {
    /// Path to an element table document (see `Utils::load_from_file`)
    pub element_table: Option<String>,
    /// Number of time points used by the kinetics simulator when none is given
    pub default_steps: usize,
    /// One of "off", "error", "warn", "info", "debug", "trace"
    pub log_level: String,
}

impl Default for ChemConfig {
    fn default() -> Self {
        Self {
            element_table: None,
            default_steps: 10,
            log_level: "info".to_string(),
        }
    }
}

impl ChemConfig {
    /// Loads configuration from a JSON file.
    ///
    /// A file that does not exist yields the default configuration; a file that exists
    /// but cannot be read or parsed is an error.
    pub fn load(config_file: &str) -> Result<Self, ChemError> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            let config: ChemConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(ChemConfig::default())
        }
    }

    pub fn save(&self, config_file: &str) -> Result<(), ChemError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_file, content)?;
        Ok(())
    }

    /// Log level for the terminal logger; unknown names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
