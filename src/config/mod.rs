//! Configuration management for dars

pub mod session;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Environment variable overriding [`Config::api_base_url`]
pub const API_URL_ENV: &str = "DARS_API_URL";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the lessons backend
    pub api_base_url: String,

    /// Selected theme name
    pub theme: String,

    /// Custom theme overrides (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<Theme>,

    /// HTTP timeout for non-streaming requests, in seconds
    pub request_timeout_secs: u64,

    /// Rows between a selection and its popup anchor
    pub anchor_offset: u16,

    /// How long the "copied" indicator stays visible, in milliseconds
    pub copied_indicator_ms: u64,

    /// Capture the mouse (needed for text selection)
    pub mouse_capture: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            theme: "Classroom".to_string(),
            custom_theme: None,
            request_timeout_secs: 30,
            anchor_offset: 1,
            copied_indicator_ms: 2000,
            mouse_capture: true,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists.
    ///
    /// `DARS_API_URL` takes precedence over the stored base URL.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("Using API URL from {}", API_URL_ENV);
                config.api_base_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    /// Load from a specific file, writing defaults there if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "dars").context("Failed to determine project directories")
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Where downloaded textbooks are stored
    pub fn textbooks_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("textbooks"))
    }

    /// Log file used while the TUI owns the terminal
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("dars.log"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn copied_duration(&self) -> Duration {
        Duration::from_millis(self.copied_indicator_ms)
    }

    /// Get the active theme
    pub fn active_theme(&self) -> Theme {
        self.custom_theme.clone().unwrap_or_else(|| Theme::by_name(&self.theme))
    }
}
