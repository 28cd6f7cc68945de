//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{MonitorError, Result};
use crate::telemetry::GpsReading;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub asset: AssetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry transport configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

/// Threshold persistence configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

/// Tracked asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AssetConfig {
    #[serde(default = "default_home_latitude")]
    pub home_latitude: f64,

    #[serde(default = "default_home_longitude")]
    pub home_longitude: f64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub file_enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

// Default value functions
fn default_address() -> String { "127.0.0.1:3000".to_string() }
fn default_reconnect_interval_ms() -> u64 { 1000 }
fn default_queue_capacity() -> usize { 256 }

fn default_data_dir() -> String { "./data".to_string() }

fn default_home_latitude() -> f64 { 6.799045 }
fn default_home_longitude() -> f64 { 80.041413 }

fn default_log_level() -> String { "info".to_string() }
fn default_log_dir() -> String { "./logs".to_string() }

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            home_latitude: default_home_latitude(),
            home_longitude: default_home_longitude(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_enabled: false,
            log_dir: default_log_dir(),
        }
    }
}

impl AssetConfig {
    /// Map position shown until the first GPS fix arrives
    pub fn home(&self) -> GpsReading {
        GpsReading {
            latitude: self.home_latitude,
            longitude: self.home_longitude,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use asset_monitor::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.transport.address.is_empty() {
            return Err(invalid("transport address cannot be empty"));
        }

        if self.transport.reconnect_interval_ms == 0
            || self.transport.reconnect_interval_ms > 60000
        {
            return Err(invalid("reconnect_interval_ms must be between 1 and 60000"));
        }

        if self.transport.queue_capacity == 0 {
            return Err(invalid("queue_capacity must be greater than 0"));
        }

        if self.storage.data_dir.is_empty() {
            return Err(invalid("storage data_dir cannot be empty"));
        }

        if !(-90.0..=90.0).contains(&self.asset.home_latitude) {
            return Err(invalid("home_latitude must be between -90 and 90"));
        }

        if !(-180.0..=180.0).contains(&self.asset.home_longitude) {
            return Err(invalid("home_longitude must be between -180 and 180"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        if self.logging.file_enabled && self.logging.log_dir.is_empty() {
            return Err(invalid("logging log_dir cannot be empty when file logging is enabled"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> MonitorError {
    MonitorError::Config(toml::de::Error::custom(msg))
}
