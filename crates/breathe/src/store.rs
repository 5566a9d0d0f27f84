//! Settings storage
//!
//! A small key-value layer for persisting the last-used exercise settings.
//! - `FileStore`: one file per key, ~/.local/share/breathe/kv/<key>
//! - `MemoryStore`: process-local map, used for ephemeral runs and tests
//! - `SettingsStore`: the single `breathParams` record on top of either

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::params::BreathParams;

/// Key under which the last-used settings are stored
pub const SETTINGS_KEY: &str = "breathParams";

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key has never been written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed key-value store
pub struct FileStore {
    /// Directory holding one file per key
    data_dir: PathBuf,
}

impl FileStore {
    /// Create a new store in the given data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Get the path of the file holding `key`
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("Invalid store key: {:?}", key);
        }
        Ok(self.data_dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory key-value store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Last-used exercise settings
///
/// Never fails towards the caller: anything that cannot be read is treated
/// as "nothing saved", and failed writes are logged.
#[derive(Clone)]
pub struct SettingsStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Settings backed by a throwaway in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Get the saved settings, if any usable ones exist
    pub fn load(&self) -> Option<BreathParams> {
        let raw = match self.backend.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read saved settings: {:#}", e);
                return None;
            }
        };

        let params: BreathParams = match serde_json::from_str(&raw) {
            Ok(params) => params,
            Err(e) => {
                warn!("Ignoring corrupt saved settings: {}", e);
                return None;
            }
        };

        if let Err(e) = params.validate() {
            warn!("Ignoring saved settings: {}", e);
            return None;
        }

        debug!(?params, "Loaded saved settings");
        Some(params)
    }

    /// Remember `params` as the last-used settings
    pub fn save(&self, params: &BreathParams) {
        let raw = match serde_json::to_string(params) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize settings: {}", e);
                return;
            }
        };

        match self.backend.set(SETTINGS_KEY, &raw) {
            Ok(()) => debug!(?params, "Saved settings"),
            Err(e) => warn!("Failed to save settings: {:#}", e),
        }
    }

    /// Forget the saved settings
    pub fn clear(&self) {
        if let Err(e) = self.backend.remove(SETTINGS_KEY) {
            warn!("Failed to clear saved settings: {:#}", e);
        }
    }
}
