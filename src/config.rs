//! Configuration file support for the map editor.
//!
//! Settings live in a small JSON document: log verbosity, delete confirmation,
//! the initial base map view, defaults for newly drawn sectors and the storage
//! key of the sector list. Natively the file sits in the user's config
//! directory; in the browser it is kept in `localStorage`.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ATTRIBUTION, DEFAULT_CENTER, DEFAULT_TILE_URL, DEFAULT_ZOOM};
use crate::state::{DEFAULT_STORAGE_KEY, SectorDefaults};
use crate::storage::{KeyValueStore, StorageError};

/// Log level setting for the application.
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
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// One step more verbose, saturating at `Trace`.
    pub fn more_verbose(self) -> Self {
        match self {
            LogLevel::Error => LogLevel::Warn,
            LogLevel::Warn => LogLevel::Info,
            LogLevel::Info => LogLevel::Debug,
            LogLevel::Debug | LogLevel::Trace => LogLevel::Trace,
        }
    }

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

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub preferences: UserPreferences,

    /// Initial base map view
    #[serde(default)]
    pub map: MapConfig,

    /// Recurrence values for newly drawn sectors
    #[serde(default)]
    pub defaults: SectorDefaults,

    /// Key of the durable slot holding the sector list
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_app_name() -> String {
    "sectormap".to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Ask before deleting a single sector
    #[serde(default = "default_confirm_deletes")]
    pub confirm_deletes: bool,
}

fn default_confirm_deletes() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            confirm_deletes: default_confirm_deletes(),
        }
    }
}

/// Base map section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial centre as `[lat, lng]`
    #[serde(default = "default_center")]
    pub center: [f64; 2],

    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Tile URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    #[serde(default = "default_attribution")]
    pub attribution: String,
}

fn default_center() -> [f64; 2] {
    [DEFAULT_CENTER.0, DEFAULT_CENTER.1]
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_tile_url() -> String {
    DEFAULT_TILE_URL.to_string()
}

fn default_attribution() -> String {
    DEFAULT_ATTRIBUTION.to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            map: MapConfig::default(),
            defaults: SectorDefaults::default(),
            storage_key: default_storage_key(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }
        if config.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "storage_key must not be empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// Default filename of the config file.
    pub fn default_filename() -> &'static str {
        "sectormap-config.json"
    }

    /// Key under which the browser build keeps its config.
    pub const STORAGE_KEY: &'static str = "sectormap-config";

    /// Get the default config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("sectormap").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("sectormap")
                    .join(Self::default_filename())
            })
        }
    }

    /// Read configuration from a file. `Ok(None)` means the file doesn't exist.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn read_from_path(path: &std::path::Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(Some(config))
    }

    /// Load configuration from a file. Returns None if the file doesn't exist
    /// or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Option<Self> {
        Self::read_from_path(path).unwrap_or_else(|e| {
            log::warn!("Failed to load config file {:?}: {}", path, e);
            None
        })
    }

    /// Try to load configuration from the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// Save configuration to a file, creating parent directories.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
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
        self.save_to_path(&path)
    }

    /// Load configuration from a key-value store (`localStorage` in the browser).
    pub fn load_from_storage(storage: &dyn KeyValueStore) -> Option<Self> {
        match storage.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from storage");
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse stored config: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("No config found in storage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read config from storage: {}", e);
                None
            }
        }
    }

    /// Save configuration to a key-value store.
    pub fn save_to_storage(&self, storage: &mut dyn KeyValueStore) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        storage.set(Self::STORAGE_KEY, &json)?;
        log::info!("Saved configuration to storage");
        Ok(())
    }
}

impl Default for AppConfig {
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
        file_version: u32,
        supported_version: u32,
    },

    /// A field holds a value the editor cannot use
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.storage_key, "hamiltonMapPolygons");
        assert_eq!(config.map.zoom, 13);
        assert_eq!(config.map.center, [-37.7870, 175.2793]);
        assert_eq!(config.defaults.frequency_in_days, 7);
        assert!(config.preferences.confirm_deletes);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "version": 1,
            "preferences": { "log_level": "debug" },
            "defaults": { "frequency_offset": 2 }
        }"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.preferences.log_level, LogLevel::Debug);
        assert!(config.preferences.confirm_deletes);
        assert_eq!(config.defaults.frequency_in_days, 7);
        assert_eq!(config.defaults.frequency_offset, 2);
    }

    #[test]
    fn test_version_too_new() {
        let result = AppConfig::from_json(r#"{"version": 99}"#);
        assert!(matches!(
            result,
            Err(ConfigError::VersionTooNew {
                file_version: 99,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        let result = AppConfig::from_json(r#"{"version": 1, "storage_key": "  "}"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_storage_round_trip() {
        let mut storage = MemoryStore::new();
        let mut config = AppConfig::default();
        config.preferences.confirm_deletes = false;
        config.map.zoom = 15;

        config.save_to_storage(&mut storage).unwrap();
        assert_eq!(AppConfig::load_from_storage(&storage), Some(config));
    }

    #[test]
    fn test_corrupt_storage_is_ignored() {
        let storage = MemoryStore::with_entry(AppConfig::STORAGE_KEY, "{ nope");
        assert_eq!(AppConfig::load_from_storage(&storage), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(AppConfig::default_filename());
        let config = AppConfig::default();

        config.save_to_path(&path).unwrap();
        assert_eq!(AppConfig::load_from_path(&path), Some(config));
    }

    #[test]
    fn test_more_verbose_saturates() {
        assert_eq!(LogLevel::Info.more_verbose(), LogLevel::Debug);
        assert_eq!(LogLevel::Trace.more_verbose(), LogLevel::Trace);
    }
}
