//! Application settings: defaults, optionally overlaid by a JSON file, then
//! by command-line flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::instruments::DEFAULT_SYMBOL;
use crate::types::{TimeFrame, ViewMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Instrument symbol shown at startup.
    pub instrument: String,
    pub time_frame: TimeFrame,
    pub view_mode: ViewMode,
    /// Months of synthetic history generated per instrument.
    pub history_months: u32,
    /// Seed for reproducible synthetic data; entropy when absent.
    pub seed: Option<u64>,
    /// Initial displayed year; defaults to the current one.
    pub year: Option<i32>,
    /// Initial displayed month, 1-12; defaults to the current one.
    pub month: Option<u32>,
    /// Web server port (web mode only).
    pub port: u16,
    /// Default tracing filter when RUST_LOG is unset.
    pub log_level: String,
    /// Log destination; TUI mode discards logs when unset.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instrument: DEFAULT_SYMBOL.to_string(),
            time_frame: TimeFrame::Daily,
            view_mode: ViewMode::All,
            history_months: 3,
            seed: None,
            year: None,
            month: None,
            port: 3000,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
