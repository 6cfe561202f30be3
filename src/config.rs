//! Application configuration, read from a TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "GALLERY_CONFIG";

/// Config file picked up from the working directory if nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "gallery.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub scroll: ScrollConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Length of every fade, ambient and layers alike.
    pub fade_ms: u64,
    /// Fade driver tick.
    pub tick_ms: u64,
    pub ambient_volume: f32,
    pub layer_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fade_ms: 1500,
            tick_ms: 10,
            ambient_volume: 0.3,
            layer_volume: 0.5,
        }
    }
}

impl AudioConfig {
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn tick(&self) -> Duration {
        // A zero tick would spin the driver.
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    /// Fraction of the viewport height the segment top must pass to enter.
    pub trigger_start: f32,
    /// Fraction of the viewport height the segment bottom must stay below.
    pub trigger_end: f32,
    /// Blank rows between segments in the reader.
    pub segment_gap: u16,
    /// Rows moved per arrow key press.
    pub scroll_step: u16,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            trigger_start: 0.6,
            trigger_end: 0.4,
            segment_gap: 6,
            scroll_step: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub catalog: PathBuf,
    pub assets_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub preferences: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("data/artworks.json"),
            assets_dir: PathBuf::from("public"),
            cache_dir: PathBuf::from(".cache/assets"),
            preferences: PathBuf::from(".cache/preferences.json"),
            log_file: None,
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl AppConfig {
    /// Load configuration from a `.toml` file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !is_toml(path) {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a `.toml` file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if !is_toml(path) {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolve the config source: explicit path, then `GALLERY_CONFIG`, then
    /// `gallery.toml` in the working directory, then built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load_from_file(local);
        }
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}
