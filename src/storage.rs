//! Persistence port.
//!
//! The store only needs named string blobs. Durable state goes through
//! [`crate::db::Database`]; state that should vanish with the session (the
//! last viewed quote) goes through [`MemoryStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;

/// Key for the serialized quote collection.
pub const QUOTES_KEY: &str = "quotes";
/// Key for the last selected category filter.
pub const FILTER_KEY: &str = "lastSelectedFilter";
/// Session key for the last quote shown.
pub const LAST_VIEWED_KEY: &str = "lastViewedQuote";

/// Get/set of named blobs.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store whose contents are dropped with the process.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("memory store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().expect("memory store lock poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set(FILTER_KEY, "Work").unwrap();

        assert_eq!(handle.get(FILTER_KEY).unwrap(), Some("Work".to_string()));
        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.get(QUOTES_KEY).unwrap().is_none());
        assert!(store.is_empty());
    }
}
