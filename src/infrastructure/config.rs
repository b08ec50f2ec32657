//! Configuration management

use crate::domain::ImageQuality;
use crate::error::{JotbookError, Result};
use chrono::{DateTime, Utc};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Directory holding the store, config and blobs inside a journal root
pub const JOTBOOK_DIR: &str = ".jotbook";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Compression quality for entry photos, in percent
    #[serde(default = "default_image_quality")]
    pub image_quality: u8,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub created: DateTime<Utc>,
}

fn default_image_quality() -> u8 {
    ImageQuality::DEFAULT.percent()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Config {
            image_quality: default_image_quality(),
            log_level: default_log_level(),
            created: Utc::now(),
        }
    }

    /// Load config from .jotbook/config.toml in the given directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(JOTBOOK_DIR).join("config.toml");

        let contents = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                JotbookError::NotAJotbookDirectory(path.to_path_buf())
            } else {
                JotbookError::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| JotbookError::Config(format!("Failed to parse config.toml: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to .jotbook/config.toml in the given directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        let jotbook_dir = path.join(JOTBOOK_DIR);
        let config_path = jotbook_dir.join("config.toml");

        if !jotbook_dir.exists() {
            fs::create_dir(&jotbook_dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.quality()?;
        self.level_filter()?;
        Ok(())
    }

    pub fn quality(&self) -> Result<ImageQuality> {
        ImageQuality::new(self.image_quality)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level).map_err(|_| {
            JotbookError::Config(format!(
                "Invalid log level: '{}'. Valid levels are: off, error, warn, info, debug, trace",
                self.log_level
            ))
        })
    }
}
