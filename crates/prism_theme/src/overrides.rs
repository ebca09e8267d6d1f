//! User override layer
//!
//! A flat map of token identity (`size/md`, `color/gray/900`) to literal
//! value. Overrides outrank document literals and only ever target token
//! identities; theme and mapping leaves are reached through references,
//! never overridden directly. Every mutation persists through the backend
//! immediately; a failed save is logged and does not abort the edit.

use prism_core::Value;
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::persist::OverrideStore;

/// Structured notice describing an override mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverrideChange {
    /// A single token identity changed.
    Token(String),
    /// The whole map was replaced or cleared.
    All,
}

/// The override layer: entries plus an optional persistence backend.
#[derive(Default)]
pub struct Overrides {
    entries: FxHashMap<String, Value>,
    backend: Option<Box<dyn OverrideStore>>,
}

impl Overrides {
    /// An unpersisted, empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the persisted map from `backend` and keep persisting through
    /// it. A missing or unreadable store starts the layer empty.
    pub fn with_backend(backend: Box<dyn OverrideStore>) -> Self {
        let entries = match backend.load() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to load persisted overrides, starting empty: {err}");
                FxHashMap::default()
            }
        };
        Self {
            entries,
            backend: Some(backend),
        }
    }

    pub fn get(&self, token: &str) -> Option<&Value> {
        self.entries.get(token)
    }

    pub fn all(&self) -> &FxHashMap<String, Value> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set(&mut self, token: impl Into<String>, value: Value) -> OverrideChange {
        let token = token.into();
        self.entries.insert(token.clone(), value);
        self.persist();
        OverrideChange::Token(token)
    }

    pub fn remove(&mut self, token: &str) -> OverrideChange {
        self.entries.remove(token);
        self.persist();
        OverrideChange::Token(token.to_string())
    }

    /// Bulk replace, e.g. loading a saved override set.
    pub fn replace_all(&mut self, entries: FxHashMap<String, Value>) -> OverrideChange {
        self.entries = entries;
        self.persist();
        OverrideChange::All
    }

    /// Revert every override.
    pub fn clear(&mut self) -> OverrideChange {
        self.entries.clear();
        self.persist();
        OverrideChange::All
    }

    fn persist(&self) {
        if let Some(backend) = &self.backend {
            if let Err(err) = backend.save(&self.entries) {
                warn!("override persistence failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;

    #[test]
    fn set_and_remove_report_the_token() {
        let mut overrides = Overrides::new();
        assert_eq!(
            overrides.set("size/md", Value::Number(24.0)),
            OverrideChange::Token("size/md".to_string())
        );
        assert_eq!(overrides.get("size/md"), Some(&Value::Number(24.0)));

        assert_eq!(
            overrides.remove("size/md"),
            OverrideChange::Token("size/md".to_string())
        );
        assert_eq!(overrides.get("size/md"), None);
    }

    #[test]
    fn bulk_replace_reports_wildcard() {
        let mut overrides = Overrides::new();
        let mut entries = FxHashMap::default();
        entries.insert("size/md".to_string(), Value::Number(20.0));
        assert_eq!(overrides.replace_all(entries), OverrideChange::All);
        assert_eq!(overrides.get("size/md"), Some(&Value::Number(20.0)));
        assert_eq!(overrides.clear(), OverrideChange::All);
        assert!(overrides.is_empty());
    }

    #[test]
    fn backend_is_written_on_every_mutation_and_read_at_startup() {
        // Write through one layer, then boot a second layer from the same
        // backend and observe the persisted state.
        let shared: &'static MemoryStore = Box::leak(Box::new(MemoryStore::new()));
        let mut overrides = Overrides::with_backend(Box::new(SharedStore(shared)));
        overrides.set("size/md", Value::Number(24.0));

        let rebooted = Overrides::with_backend(Box::new(SharedStore(shared)));
        assert_eq!(rebooted.get("size/md"), Some(&Value::Number(24.0)));
    }

    struct SharedStore(&'static MemoryStore);

    impl OverrideStore for SharedStore {
        fn load(&self) -> Result<FxHashMap<String, Value>, crate::persist::PersistError> {
            self.0.load()
        }

        fn save(
            &self,
            entries: &FxHashMap<String, Value>,
        ) -> Result<(), crate::persist::PersistError> {
            self.0.save(entries)
        }
    }
}
