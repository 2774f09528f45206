use crate::engine::{EngineConfig, EvictionPolicy};
use crate::settings::ScannerSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no per-user config directory on this platform")]
    NoConfigDir,
    #[error("{name} must be a positive size in metres, got {value}")]
    InvalidMarkerSize { name: &'static str, value: f64 },
    #[error("timeout must be a non-negative number of seconds, got {0}")]
    InvalidTimeout(f64),
    #[error("unknown marker type '{0}'")]
    UnknownMarkerType(String),
    #[error("unknown eviction policy '{0}' (expected immediate or timeout)")]
    UnknownPolicy(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub scanner: ScannerSettings,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    pub eviction: EvictionPolicy,
    /// Grace period before an unobserved marker is removed, in seconds
    pub timeout_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub color: bool,
    pub show_settings: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            eviction: EvictionPolicy::Immediate,
            timeout_secs: 0.5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_settings: true,
        }
    }
}

impl TrackingConfig {
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let timeout = Duration::try_from_secs_f64(self.timeout_secs)
            .map_err(|_| ConfigError::InvalidTimeout(self.timeout_secs))?;
        Ok(EngineConfig {
            policy: self.eviction,
            timeout,
        })
    }
}

impl Config {
    /// Load the per-user config file, falling back to defaults when it is
    /// missing or invalid.
    pub fn load() -> Self {
        let Some(path) = Self::config_file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring config file: {e}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracking.engine_config()?;
        self.scanner.validate()
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(write_err)
    }

    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|mut path| {
            path.push("config.toml");
            path
        })
    }

    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("markersense");
            path
        })
    }
}
