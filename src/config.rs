use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional settings file, looked up in the working directory.
pub const CONFIG_FILE: &str = "data-sweeper.json";

/// User-tunable settings. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Rows shown in each file's preview grid.
    pub preview_rows: usize,
    /// How many numeric columns the bar chart draws.
    pub chart_columns: usize,
    /// Initial window size in points.
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            chart_columns: 2,
            window_size: [1200.0, 800.0],
        }
    }
}

impl AppConfig {
    /// Read [`CONFIG_FILE`] if it exists. A missing file gives the defaults;
    /// an unreadable one is logged and also gives the defaults.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::from_path(path) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).context("reading settings file")?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing settings JSON")
    }
}
