use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ChatError, Result};

pub const DEFAULT_MODEL: &str = "gemma2:2b";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_ABOUT_URL: &str = "https://github.com/ollama/ollama";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

/// Startup configuration, built once and handed to every component that needs it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub base_url: String,
    pub app_title: String,
    pub theme: ThemeMode,
    /// Where conversations are saved and listed. `None` means the working directory.
    pub conversations_dir: Option<PathBuf>,
    pub about_url: String,
    /// Per-request timeout for the model service; 0 disables it.
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            app_title: "LocalChat".to_string(),
            theme: ThemeMode::Dark,
            conversations_dir: None,
            about_url: DEFAULT_ABOUT_URL.to_string(),
            request_timeout_secs: 300,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Persist only the theme, keeping whatever else is on disk.
    /// An unreadable file is left untouched and reported.
    pub fn save_theme(path: &Path, theme: ThemeMode) -> Result<()> {
        let mut config = Self::load_from(path)?;
        config.theme = theme;
        config.save_to(path)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn conversations_dir(&self) -> PathBuf {
        self.conversations_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatError::Config("could not determine config directory".to_string()))?;

        Ok(config_dir.join("localchat").join("config.json"))
    }
}
