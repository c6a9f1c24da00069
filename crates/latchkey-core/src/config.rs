//! Application configuration management.
//!
//! Handles loading, saving, and validating latchkey configuration:
//! - Scheduling limits (max duration, adjacency threshold, code length)
//! - Managed device catalog
//! - Data directory for the JSON repository
//! - Timezone and cleanup cadence

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grouping::DEFAULT_ADJACENCY_THRESHOLD_SECS;
use crate::validation::MAX_DURATION_HOURS;

/// Error loading, saving, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file could not be written.
    #[error("failed to write {path}: {source}")]
    WriteError {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file exists but could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The configuration was parsed but contains an invalid value.
    #[error("configuration validation failed: {field}: {message}")]
    ValidationError {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatchkeyConfig {
    /// Scheduling limits.
    pub scheduling: SchedulingConfig,

    /// Storage locations.
    pub storage: StorageConfig,

    /// System-wide settings.
    pub system: SystemConfig,

    /// Managed devices.
    pub devices: Vec<DeviceConfig>,
}

/// Limits applied when scheduling bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Maximum booking duration in hours.
    pub max_duration_hours: i64,

    /// Gap below which adjacent bookings count as consecutive, in seconds.
    pub adjacency_threshold_secs: i64,

    /// Length of generated access codes in digits.
    pub code_length: usize,
}

/// Storage locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Data directory for booking and user records.
    /// Defaults to the platform data dir when unset.
    pub data_dir: Option<PathBuf>,
}

/// System-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Timezone used when presenting instants to humans.
    #[serde(with = "timezone_serde")]
    pub timezone: Tz,

    /// Seconds between cleanup passes.
    pub cleanup_interval_secs: u64,

    /// How far ahead of a booking's end to emit an expiry reminder, in hours.
    pub reminder_lead_hours: i64,
}

/// A managed device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device identifier at the access code provider.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Device kind.
    #[serde(default = "default_device_kind")]
    pub kind: String,
}

fn default_device_kind() -> String {
    "smart_lock".to_owned()
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            max_duration_hours: MAX_DURATION_HOURS,
            adjacency_threshold_secs: DEFAULT_ADJACENCY_THRESHOLD_SECS,
            code_length: crate::codegen::DEFAULT_CODE_LENGTH,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            cleanup_interval_secs: 3600,
            reminder_lead_hours: 24,
        }
    }
}

impl Default for LatchkeyConfig {
    fn default() -> Self {
        Self {
            scheduling: SchedulingConfig::default(),
            storage: StorageConfig::default(),
            system: SystemConfig::default(),
            devices: Vec::new(),
        }
    }
}

impl LatchkeyConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed, or
    /// if the parsed values fail validation.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source,
                })?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteError {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The default configuration file path.
    ///
    /// `/etc/latchkey/config.toml` on Linux deployments, the platform
    /// config dir elsewhere (for development).
    #[must_use]
    pub fn default_path() -> PathBuf {
        #[cfg(target_os = "linux")]
        {
            PathBuf::from("/etc/latchkey/config.toml")
        }
        #[cfg(not(target_os = "linux"))]
        {
            directories::ProjectDirs::from("", "", "latchkey")
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .unwrap_or_else(|| PathBuf::from("./config.toml"))
        }
    }

    /// Check that all values are usable.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduling.max_duration_hours <= 0 {
            return Err(ConfigError::ValidationError {
                field: "scheduling.max_duration_hours",
                message: "must be positive".to_owned(),
            });
        }
        if self.scheduling.adjacency_threshold_secs < 0 {
            return Err(ConfigError::ValidationError {
                field: "scheduling.adjacency_threshold_secs",
                message: "cannot be negative".to_owned(),
            });
        }
        if self.scheduling.code_length < 4 || self.scheduling.code_length > 10 {
            return Err(ConfigError::ValidationError {
                field: "scheduling.code_length",
                message: format!("must be 4-10 digits, got {}", self.scheduling.code_length),
            });
        }
        if self.system.cleanup_interval_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "system.cleanup_interval_secs",
                message: "must be positive".to_owned(),
            });
        }
        if self.system.reminder_lead_hours < 0 {
            return Err(ConfigError::ValidationError {
                field: "system.reminder_lead_hours",
                message: "cannot be negative".to_owned(),
            });
        }
        for device in &self.devices {
            if device.id.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    field: "devices.id",
                    message: "device id cannot be empty".to_owned(),
                });
            }
        }
        Ok(())
    }
}

mod timezone_serde {
    use chrono_tz::Tz;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(tz: &Tz, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(tz.name())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Tz, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
