//! Sled-backed store for the persisted settings.
//!
//! One key per setting, JSON values. Updates are plain read-modify-write
//! with no transaction, so concurrent writers race and the last write wins.

use crate::exclusion::{is_excluded, site_pattern, validate_pattern, PatternError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

const KEY_ENABLED: &str = "extensionEnabled";
const KEY_EXCLUDED: &str = "excludedSites";
const KEY_DRAWER: &str = "drawerPosition";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    DbError(#[from] sled::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Snapshot of every persisted setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub extension_enabled: bool,
    pub excluded_sites: Vec<String>,
    pub drawer_position: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension_enabled: true,
            excluded_sites: Vec::new(),
            drawer_position: 0.0,
        }
    }
}

impl Settings {
    /// Whether the page UI should be injected on this URL.
    pub fn should_inject(&self, url: &str) -> bool {
        self.extension_enabled && !is_excluded(url, &self.excluded_sites)
    }
}

/// Persistent key-value settings store.
pub struct SettingsStore {
    db: sled::Db,
}

impl SettingsStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let data = serde_json::to_vec(value)?;
        self.db.insert(key.as_bytes(), data)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn enabled(&self) -> Result<bool, StorageError> {
        Ok(self.get(KEY_ENABLED)?.unwrap_or(true))
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.set(KEY_ENABLED, &enabled)
    }

    pub fn excluded_sites(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.get(KEY_EXCLUDED)?.unwrap_or_default())
    }

    /// Validate and append a pattern. Returns `false` if it was already stored.
    pub fn add_pattern(&self, pattern: &str) -> Result<bool, StorageError> {
        let pattern = validate_pattern(pattern)?;
        let mut sites = self.excluded_sites()?;
        if sites.iter().any(|p| p == pattern) {
            return Ok(false);
        }
        sites.push(pattern.to_string());
        self.set(KEY_EXCLUDED, &sites)?;
        info!(pattern, "added exclusion pattern");
        Ok(true)
    }

    /// Remove the pattern at `index`, returning it if the index existed.
    pub fn remove_pattern(&self, index: usize) -> Result<Option<String>, StorageError> {
        let mut sites = self.excluded_sites()?;
        if index >= sites.len() {
            warn!(index, len = sites.len(), "no exclusion pattern at index");
            return Ok(None);
        }
        let removed = sites.remove(index);
        self.set(KEY_EXCLUDED, &sites)?;
        Ok(Some(removed))
    }

    /// Exclude every page on the URL's host. Returns the synthesized pattern.
    pub fn hide_on_site(&self, url: &str) -> Result<String, StorageError> {
        let pattern = site_pattern(url)?;
        self.add_pattern(&pattern)?;
        Ok(pattern)
    }

    pub fn drawer_position(&self) -> Result<f64, StorageError> {
        Ok(self.get(KEY_DRAWER)?.unwrap_or(0.0))
    }

    pub fn set_drawer_position(&self, position: f64) -> Result<(), StorageError> {
        self.set(KEY_DRAWER, &position)
    }

    pub fn snapshot(&self) -> Result<Settings, StorageError> {
        Ok(Settings {
            extension_enabled: self.enabled()?,
            excluded_sites: self.excluded_sites()?,
            drawer_position: self.drawer_position()?,
        })
    }
}
