//! Configuration file support.
//!
//! Settings are stored as JSON. The colormap section replaces the fixed
//! last-colormap path with a configurable one.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::colormap::LoaderConfig;
use crate::constants::{
    APP_DIR_NAME, DEFAULT_LABEL_ALPHA, DEFAULT_THRESHOLD, LAST_COLORMAP_FILENAME,
};
use crate::threshold::ImageThreshold;

/// Log level setting for the toolbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Install `env_logger` at the given level. `RUST_LOG` still overrides it.
///
/// Returns false if a logger was already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logger(level: LogLevel) -> bool {
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .try_init()
        .is_ok()
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Toolbox configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolboxConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Colormap loader settings
    #[serde(default)]
    pub colormap: ColormapSettings,

    /// Threshold widget defaults
    #[serde(default)]
    pub threshold: ThresholdSettings,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Colormap loader section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColormapSettings {
    /// Alpha applied to every label color
    #[serde(default = "default_label_alpha")]
    pub label_alpha: f32,

    /// Where the last loaded colormap is kept (None = platform cache dir)
    #[serde(default)]
    pub cache_path: Option<PathBuf>,

    /// Reload the last colormap when the widget opens
    #[serde(default = "default_restore_last")]
    pub restore_last: bool,
}

fn default_label_alpha() -> f32 {
    DEFAULT_LABEL_ALPHA
}

fn default_restore_last() -> bool {
    true
}

impl Default for ColormapSettings {
    fn default() -> Self {
        Self {
            label_alpha: default_label_alpha(),
            cache_path: None,
            restore_last: default_restore_last(),
        }
    }
}

impl ColormapSettings {
    /// Cache path to use: the configured one, else the platform cache
    /// directory, else the system temp directory.
    pub fn resolved_cache_path(&self) -> PathBuf {
        if let Some(path) = &self.cache_path {
            return path.clone();
        }

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join(APP_DIR_NAME).join(LAST_COLORMAP_FILENAME);
        }

        std::env::temp_dir()
            .join(APP_DIR_NAME)
            .join(LAST_COLORMAP_FILENAME)
    }

    /// Build the loader configuration. Alpha is clamped to 0-1.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::new()
            .alpha(self.label_alpha.clamp(0.0, 1.0))
            .cache_path(self.resolved_cache_path())
    }
}

/// Threshold widget section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSettings {
    /// Initial slider position
    #[serde(default = "default_threshold")]
    pub default_threshold: f32,

    /// Initial state of "keep pixels below threshold"
    #[serde(default)]
    pub keep_below: bool,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            keep_below: false,
        }
    }
}

impl ThresholdSettings {
    /// Create a threshold widget with these defaults.
    pub fn widget(&self) -> ImageThreshold {
        ImageThreshold::new().with_settings(self.default_threshold, self.keep_below)
    }
}

impl ToolboxConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            colormap: ColormapSettings::default(),
            threshold: ThresholdSettings::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "medical-toolbox.json"
    }

    /// Read configuration from a file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get the default config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join(APP_DIR_NAME).join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join(APP_DIR_NAME)
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to(&path)
    }
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        /// Version found in the file
        file_version: u32,
        /// Highest version this build understands
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut config = ToolboxConfig::new();
        config.colormap.label_alpha = 1.0;
        config.colormap.cache_path = Some(PathBuf::from("/data/cmap/last.txt"));
        config.log_level = LogLevel::Debug;

        let parsed = ToolboxConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = ToolboxConfig::from_json(r#"{ "version": 1 }"#).unwrap();
        assert_eq!(config.colormap.label_alpha, DEFAULT_LABEL_ALPHA);
        assert!(config.colormap.restore_last);
        assert_eq!(config.threshold.default_threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        assert!(matches!(
            ToolboxConfig::from_json(&json),
            Err(ConfigError::VersionTooNew { .. })
        ));
        assert!(matches!(
            ToolboxConfig::from_json("not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_loader_config_from_settings() {
        let settings = ColormapSettings {
            label_alpha: 3.0,
            cache_path: Some(PathBuf::from("/tmp/cmap/last.txt")),
            restore_last: true,
        };
        let loader = settings.loader_config();
        assert_eq!(loader.alpha, 1.0);
        assert_eq!(loader.cache_path, Some(PathBuf::from("/tmp/cmap/last.txt")));

        let fallback = ColormapSettings::default().resolved_cache_path();
        assert!(fallback.ends_with(LAST_COLORMAP_FILENAME));
    }

    #[test]
    fn test_threshold_widget_defaults() {
        let settings = ThresholdSettings {
            default_threshold: 0.25,
            keep_below: true,
        };
        let widget = settings.widget();
        assert_eq!(widget.threshold(), 0.25);
        assert!(widget.keep_below());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_init_logger_only_once() {
        let json = r#"{ "version": 1, "log_level": "debug" }"#;
        let config = ToolboxConfig::from_json(json).unwrap();
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);

        init_logger(config.log_level);
        assert!(!init_logger(LogLevel::Trace));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir()
            .join(format!("medical-toolbox-config-{}", std::process::id()))
            .join(ToolboxConfig::default_filename());
        let config = ToolboxConfig::new();
        config.save_to(&path).unwrap();
        assert_eq!(ToolboxConfig::load_from(&path).unwrap(), config);
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
