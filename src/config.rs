use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils;

/// On-disk configuration. Every field has a sane default so a missing or
/// partial config file is fine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the platform-default SQLite path.
    pub database_path: Option<PathBuf>,
    /// Overrides the built-in holiday country list (ISO alpha-2 codes).
    pub countries: Option<Vec<String>>,
}

impl AppConfig {
    /// Reads the config file, then applies the `VELO_SCOUT_DB` environment
    /// override on top.
    pub fn load() -> Self {
        let mut config = read_config(&utils::config_path()).unwrap_or_else(|err| {
            log::warn!("unreadable config, using defaults: {err}");
            AppConfig::default()
        });
        if let Ok(path) = std::env::var("VELO_SCOUT_DB") {
            if !path.trim().is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }
        config
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(utils::database_path)
    }
}

fn read_config(path: &PathBuf) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}
