// SPDX-License-Identifier: GPL-3.0-or-later
// src/config.rs
//
// User configuration, stored as JSON in the user config directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constant::{CONFIG_DIR, CONFIG_FILE};
use crate::domain::image::Filter;
use crate::error::ResizerResult;

/// Global configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory crops are written to when no output path is given.
    pub output_dir: Option<PathBuf>,
    /// Remember the last submitted filter between runs.
    pub remember_filter: bool,
    /// Filter preselected when nothing is remembered.
    pub default_filter: Filter,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs::picture_dir().or_else(dirs::home_dir),
            remember_filter: true,
            default_filter: Filter::None,
        }
    }
}

impl AppConfig {
    /// Location of the config file, if the platform has a config dir.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the user config, falling back to defaults when it is missing or
    /// broken.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        Self::read_from(&path).unwrap_or_else(|e| {
            log::warn!("Failed to load config {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn read_from(path: &Path) -> ResizerResult<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_to(&self, path: &Path) -> ResizerResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn saved_config_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kekstagram").join("config.json");
        let config = AppConfig {
            output_dir: Some(dir.path().to_path_buf()),
            remember_filter: false,
            default_filter: Filter::Sepia,
        };

        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::read_from(&path).unwrap(), config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "default_filter": "marvin" }"#).unwrap();

        let config = AppConfig::read_from(&path).unwrap();
        assert_eq!(config.default_filter, Filter::Marvin);
        assert!(config.remember_filter);
    }

    #[test]
    fn broken_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "nope").unwrap();
        assert!(AppConfig::read_from(&path).is_err());
    }
}
