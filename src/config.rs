//! Application configuration management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use serde::{Deserialize, Serialize};

/// Smallest accepted debounce delay.
const MIN_DEBOUNCE_MS: u64 = 50;

/// Largest accepted debounce delay.
const MAX_DEBOUNCE_MS: u64 = 5000;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Backend API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the lyrics API (e.g., "http://127.0.0.1:5000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Search-as-you-type configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Show the song thumbnail (requires sixel/kitty/iterm support)
    #[serde(default = "default_true")]
    pub show_thumbnail: bool,
}

fn default_base_url() -> String {
    String::from("http://127.0.0.1:5000")
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_thumbnail: true,
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;

        Ok(config_dir.join("lyricscope").join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.normalize();

        Ok(config)
    }

    /// Clamp values into their accepted ranges.
    pub fn normalize(&mut self) {
        self.search.debounce_ms = self.search.debounce_ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS);
        self.api.base_url = self.api.base_url.trim().to_string();
    }

    /// Debounce delay as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    /// Check if the configuration is usable for connecting.
    pub fn is_valid(&self) -> bool {
        let url = &self.api.base_url;
        !url.is_empty() && (url.starts_with("http://") || url.starts_with("https://"))
    }
}
