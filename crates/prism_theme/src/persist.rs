//! Override persistence backends
//!
//! The override map persists as a flat JSON object under a single
//! well-known storage key. The engine only needs `load` and `save`;
//! anything that can hold a string blob can back it.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use prism_core::Value;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Single well-known key the override map is stored under.
pub const OVERRIDE_STORAGE_KEY: &str = "prism.overrides";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("override store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("override store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A simple key-value backend for the persisted override map.
pub trait OverrideStore {
    fn load(&self) -> Result<FxHashMap<String, Value>, PersistError>;
    fn save(&self, entries: &FxHashMap<String, Value>) -> Result<(), PersistError>;
}

/// Flat JSON file at `<dir>/prism.overrides.json`.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{OVERRIDE_STORAGE_KEY}.json")),
        }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverrideStore for JsonFileStore {
    fn load(&self) -> Result<FxHashMap<String, Value>, PersistError> {
        if !self.path.exists() {
            // A store that was never written is an empty override set.
            return Ok(FxHashMap::default());
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, entries: &FxHashMap<String, Value>) -> Result<(), PersistError> {
        let text = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

/// In-memory backend for tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<FxHashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for MemoryStore {
    fn load(&self) -> Result<FxHashMap<String, Value>, PersistError> {
        Ok(self.entries.lock().unwrap().clone())
    }

    fn save(&self, entries: &FxHashMap<String, Value>) -> Result<(), PersistError> {
        *self.entries.lock().unwrap() = entries.clone();
        Ok(())
    }
}
