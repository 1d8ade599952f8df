//! # Application Config
//!
//! Settings for the CSV layer, kept in a single YAML file.
//!
//! ## YAML Format
//!
//! ```yaml
//! delimiter: ";"
//! students_file: students.csv
//! groups_file: groups.csv
//! ```
//!
//! Missing keys take their defaults, so an empty file is a valid config.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::csv::Delimiter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Field separator for every CSV file, a single ASCII character
    pub delimiter: String,
    /// Student file used by `CsvService::load_all` / `save_all`
    pub students_file: PathBuf,
    /// Group file used by `CsvService::load_all` / `save_all`
    pub groups_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::DEFAULT.to_string(),
            students_file: PathBuf::from("students.csv"),
            groups_file: PathBuf::from("groups.csv"),
        }
    }
}

impl AppConfig {
    /// Load the config from `path`, writing the defaults there first if the
    /// file does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let yaml_content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {:?}", path))?;
            let config: AppConfig = if yaml_content.trim().is_empty() {
                AppConfig::default()
            } else {
                serde_yaml::from_str(&yaml_content)
                    .with_context(|| format!("Failed to parse config file {:?}", path))?
            };
            debug!("Loaded config from {:?}: {:?}", path, config);
            Ok(config)
        } else {
            let config = AppConfig::default();
            config.save(path)?;
            info!("Created default config at {:?}", path);
            Ok(config)
        }
    }

    /// Write the config atomically (temp file, then rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml_content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml_content)
            .with_context(|| format!("Failed to write temp config file {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move config into place at {:?}", path))?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }

    /// The configured delimiter, validated
    pub fn delimiter(&self) -> crate::error::Result<Delimiter> {
        Delimiter::parse(&self.delimiter)
    }

    /// Resolve relative file paths against `base` (usually the config file's directory)
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.students_file.is_relative() {
            self.students_file = base.join(&self.students_file);
        }
        if self.groups_file.is_relative() {
            self.groups_file = base.join(&self.groups_file);
        }
        self
    }
}
