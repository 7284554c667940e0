//! Key-value preferences behind a minimal interface
//!
//! The account API key and other small settings live here. Shells on
//! platforms with their own settings store implement [`Preferences`] over
//! that store; [`FilePreferences`] persists a flat YAML map under the home
//! directory for everything else, and [`MemoryPreferences`] backs tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::Result;

use crate::config::PREF_API_KEY;

/// Minimal KV surface the client needs. Object safe.
pub trait Preferences: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// The stored API key, or an empty string while no account is linked.
pub fn stored_api_key(prefs: &dyn Preferences) -> String {
    prefs.get(PREF_API_KEY).unwrap_or_default()
}

/// Preferences persisted as a YAML map, written through on every change.
pub struct FilePreferences {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FilePreferences {
    /// Store under `~/.dropwell/settings.yaml`.
    pub fn open_default() -> Self {
        let dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".dropwell");
        Self::open(dir.join("settings.yaml"))
    }

    /// Store at an explicit path. A missing file reads as an empty map.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = load_map(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load preferences, starting empty");
            HashMap::new()
        });
        FilePreferences {
            path,
            cache: RwLock::new(cache),
        }
    }

    fn persist(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(map)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

fn load_map(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.cache.read().unwrap_or_else(|p| p.into_inner());
        map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.cache.write().unwrap_or_else(|p| p.into_inner());
        map.insert(key.to_string(), value.to_string());
        self.persist(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.cache.write().unwrap_or_else(|p| p.into_inner());
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&map)
    }
}

/// In-memory preferences for tests and embedders with transient settings.
#[derive(Default)]
pub struct MemoryPreferences {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with an API key, the common test fixture.
    pub fn with_api_key(key: &str) -> Self {
        let prefs = Self::new();
        let _ = prefs.set(PREF_API_KEY, key);
        prefs
    }
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.map.read().unwrap_or_else(|p| p.into_inner());
        map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.write().unwrap_or_else(|p| p.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.map.write().unwrap_or_else(|p| p.into_inner());
        map.remove(key);
        Ok(())
    }
}
