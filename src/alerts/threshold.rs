//! # Threshold Store
//!
//! Holds the user-configured alert thresholds and persists them across
//! restarts.
//!
//! The persisted form is a single key, [`THRESHOLDS_KEY`], holding the JSON
//! encoding of [`ThresholdConfig`]. Anything unreadable under that key is
//! treated as if nothing had been saved.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::error::{MonitorError, Result};

/// Storage key of the persisted thresholds
pub const THRESHOLDS_KEY: &str = "thresholds";

/// Default temperature threshold in °C
pub const DEFAULT_TEMPERATURE_THRESHOLD: f64 = 30.0;

/// Default humidity threshold in %
pub const DEFAULT_HUMIDITY_THRESHOLD: f64 = 70.0;

/// Alert thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE_THRESHOLD,
            humidity: DEFAULT_HUMIDITY_THRESHOLD,
        }
    }
}

/// Partial threshold edit; `None` keeps the current value
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct ThresholdUpdate {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

impl ThresholdUpdate {
    pub fn temperature(value: f64) -> Self {
        Self { temperature: Some(value), humidity: None }
    }

    pub fn humidity(value: f64) -> Self {
        Self { temperature: None, humidity: Some(value) }
    }

    /// Merge over `base`, rejecting non-finite values
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidThreshold`] if a provided value is NaN or infinite
    pub fn apply_to(&self, base: ThresholdConfig) -> Result<ThresholdConfig> {
        for (name, value) in [("temperature", self.temperature), ("humidity", self.humidity)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(MonitorError::InvalidThreshold(format!(
                        "{} threshold must be a finite number, got {}",
                        name, v
                    )));
                }
            }
        }

        Ok(ThresholdConfig {
            temperature: self.temperature.unwrap_or(base.temperature),
            humidity: self.humidity.unwrap_or(base.humidity),
        })
    }
}

/// Key-value persistence backend
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send {
    /// Read a value; `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value durably before returning
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<key>.json` under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash never leaves a half-written file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        debug!("Persisted '{}' to {}", key, path.display());
        Ok(())
    }
}

/// In-memory store; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Owner of the current thresholds and their persisted copy
pub struct ThresholdStore {
    backend: Box<dyn KeyValueStore>,
    current: ThresholdConfig,
}

impl std::fmt::Debug for ThresholdStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdStore")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl ThresholdStore {
    /// Open a store and load the persisted thresholds
    ///
    /// # Examples
    ///
    /// ```
    /// use asset_monitor::alerts::threshold::{MemoryStore, ThresholdConfig, ThresholdStore};
    ///
    /// let store = ThresholdStore::open(Box::new(MemoryStore::new()));
    /// assert_eq!(store.current(), ThresholdConfig::default());
    /// ```
    pub fn open(backend: Box<dyn KeyValueStore>) -> Self {
        let mut store = Self {
            backend,
            current: ThresholdConfig::default(),
        };
        store.load();
        store
    }

    /// Reload thresholds from the backend
    ///
    /// Falls back to [`ThresholdConfig::default`] when nothing is stored,
    /// the stored text is not a valid config, or the backend read fails.
    pub fn load(&mut self) -> ThresholdConfig {
        self.current = match self.backend.get(THRESHOLDS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<ThresholdConfig>(&raw) {
                Ok(config) if config.temperature.is_finite() && config.humidity.is_finite() => {
                    config
                }
                Ok(_) => {
                    warn!("Persisted thresholds are not finite, using defaults");
                    ThresholdConfig::default()
                }
                Err(e) => {
                    warn!("Persisted thresholds are unreadable ({}), using defaults", e);
                    ThresholdConfig::default()
                }
            },
            Ok(None) => {
                debug!("No persisted thresholds, using defaults");
                ThresholdConfig::default()
            }
            Err(e) => {
                warn!("Failed to read persisted thresholds ({}), using defaults", e);
                ThresholdConfig::default()
            }
        };

        self.current
    }

    /// Persist `config` and make it current
    ///
    /// The in-memory value only changes once the write has succeeded.
    ///
    /// # Errors
    ///
    /// Returns error if encoding or the backend write fails
    pub fn save(&mut self, config: ThresholdConfig) -> Result<()> {
        let encoded = serde_json::to_string(&config)?;
        self.backend.set(THRESHOLDS_KEY, &encoded)?;
        self.current = config;
        Ok(())
    }

    /// Merge a partial edit over the current thresholds, persist and return the result
    ///
    /// # Errors
    ///
    /// Returns error if a value is not finite or the write fails; the
    /// current thresholds are left unchanged in both cases
    pub fn update(&mut self, partial: ThresholdUpdate) -> Result<ThresholdConfig> {
        let next = partial.apply_to(self.current)?;
        self.save(next)?;
        info!(
            "Thresholds updated: temperature > {}°C, humidity > {}%",
            next.temperature, next.humidity
        );
        Ok(next)
    }

    #[must_use]
    pub fn current(&self) -> ThresholdConfig {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = ThresholdConfig::default();
        assert_eq!(config.temperature, 30.0);
        assert_eq!(config.humidity, 70.0);
    }

    #[test]
    fn test_apply_partial_update() {
        let merged = ThresholdUpdate::humidity(55.0).apply_to(ThresholdConfig::default()).unwrap();
        assert_eq!(merged, ThresholdConfig { temperature: 30.0, humidity: 55.0 });
    }

    #[test]
    fn test_apply_rejects_non_finite() {
        let result = ThresholdUpdate::temperature(f64::NAN).apply_to(ThresholdConfig::default());
        assert!(matches!(result, Err(MonitorError::InvalidThreshold(_))));

        let result = ThresholdUpdate::humidity(f64::INFINITY).apply_to(ThresholdConfig::default());
        assert!(matches!(result, Err(MonitorError::InvalidThreshold(_))));
    }

    #[test]
    fn test_update_deserializes_partial_json() {
        let update: ThresholdUpdate = serde_json::from_str(r#"{"temperature": 35}"#).unwrap();
        assert_eq!(update, ThresholdUpdate::temperature(35.0));
    }

    #[test]
    fn test_open_empty_store_uses_defaults() {
        let store = ThresholdStore::open(Box::new(MemoryStore::new()));
        assert_eq!(store.current(), ThresholdConfig::default());
    }

    #[test]
    fn test_update_then_reload_returns_updated_value() {
        let backend = MemoryStore::new();
        let mut store = ThresholdStore::open(Box::new(backend.clone()));
        let updated = store.update(ThresholdUpdate::temperature(35.0)).unwrap();
        assert_eq!(updated, ThresholdConfig { temperature: 35.0, humidity: 70.0 });

        // A fresh store over the same backend simulates a restart
        let mut reloaded = ThresholdStore::open(Box::new(backend));
        assert_eq!(reloaded.current(), updated);
        assert_eq!(reloaded.load(), updated);
    }

    #[test]
    fn test_corrupt_persisted_value_is_treated_as_absent() {
        for raw in ["not json", "{}", r#"{"temperature": "hot", "humidity": 70}"#, "null"] {
            let mut backend = MemoryStore::new();
            backend.set(THRESHOLDS_KEY, raw).unwrap();
            let store = ThresholdStore::open(Box::new(backend));
            assert_eq!(store.current(), ThresholdConfig::default(), "raw value: {}", raw);
        }
    }

    #[test]
    fn test_backend_read_failure_uses_defaults() {
        let mut backend = MockKeyValueStore::new();
        backend
            .expect_get()
            .withf(|key| key == THRESHOLDS_KEY)
            .returning(|_| {
                Err(MonitorError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied")))
            });

        let store = ThresholdStore::open(Box::new(backend));
        assert_eq!(store.current(), ThresholdConfig::default());
    }

    #[test]
    fn test_failed_save_keeps_previous_value() {
        let mut backend = MockKeyValueStore::new();
        backend
            .expect_get()
            .returning(|_| Ok(Some(r#"{"temperature": 25.0, "humidity": 60.0}"#.to_string())));
        backend
            .expect_set()
            .times(1)
            .returning(|_, _| {
                Err(MonitorError::Io(io::Error::new(io::ErrorKind::Other, "disk full")))
            });

        let mut store = ThresholdStore::open(Box::new(backend));
        let result = store.update(ThresholdUpdate::temperature(40.0));

        assert!(result.is_err());
        assert_eq!(store.current(), ThresholdConfig { temperature: 25.0, humidity: 60.0 });
    }

    #[test]
    fn test_save_writes_full_config() {
        let mut backend = MockKeyValueStore::new();
        backend.expect_get().returning(|_| Ok(None));
        backend
            .expect_set()
            .withf(|key, value| {
                key == THRESHOLDS_KEY
                    && serde_json::from_str::<ThresholdConfig>(value).ok()
                        == Some(ThresholdConfig { temperature: 30.0, humidity: 80.0 })
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut store = ThresholdStore::open(Box::new(backend));
        store.update(ThresholdUpdate::humidity(80.0)).unwrap();
    }

    #[test]
    fn test_invalid_update_is_not_persisted() {
        let mut backend = MockKeyValueStore::new();
        backend.expect_get().returning(|_| Ok(None));
        backend.expect_set().never();

        let mut store = ThresholdStore::open(Box::new(backend));
        assert!(store.update(ThresholdUpdate::temperature(f64::NAN)).is_err());
        assert_eq!(store.current(), ThresholdConfig::default());
    }

    #[test]
    fn test_file_store_round_trip_across_restart() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let mut store = ThresholdStore::open(Box::new(FileStore::new(&data_dir)));
        store.update(ThresholdUpdate { temperature: Some(28.5), humidity: Some(65.0) }).unwrap();

        assert!(data_dir.join("thresholds.json").exists());
        assert!(!data_dir.join("thresholds.json.tmp").exists());

        let reloaded = ThresholdStore::open(Box::new(FileStore::new(&data_dir)));
        assert_eq!(reloaded.current(), ThresholdConfig { temperature: 28.5, humidity: 65.0 });
    }

    #[test]
    fn test_file_store_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("thresholds").unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("thresholds.json"), "{\"temperature\":").unwrap();

        let store = ThresholdStore::open(Box::new(FileStore::new(dir.path())));
        assert_eq!(store.current(), ThresholdConfig::default());
    }
}
