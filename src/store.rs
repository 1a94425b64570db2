//! # Durable Property Store
//!
//! Key-value persistence for job state that must survive process restarts:
//! the progress cursor and the cumulative metrics counters. All values
//! round-trip through strings; numeric coercion lives with the callers.

use crate::error::{BatchError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Abstraction over a durable string key-value store.
///
/// The job is single-flight by the trigger-uniqueness invariant, so
/// implementations need interior mutability but no cross-process locking.
pub trait PropertyStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Write several properties as one logical unit.
    fn set_all(&self, pairs: &[(&str, String)]) -> Result<()>;
    fn delete_all(&self) -> Result<()>;
}

/// Read a counter property, substituting 0 when absent.
pub fn read_counter(store: &dyn PropertyStore, key: &str) -> Result<u64> {
    match store.get(key)? {
        Some(raw) => raw
            .parse()
            .map_err(|e| BatchError::StoreError(format!("Invalid counter for {key}: {e}"))),
        None => Ok(0),
    }
}

/// In-memory property store for tests and ephemeral embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    props: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PropertyStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.props.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.props.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_all(&self, pairs: &[(&str, String)]) -> Result<()> {
        let mut props = self.props.lock();
        for (key, value) in pairs {
            props.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.props.lock().clear();
        Ok(())
    }
}

/// JSON-file-backed property store. Every mutation writes the full map
/// back to disk so a killed process never loses acknowledged state.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    props: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading existing properties if present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let props = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|e| BatchError::StoreError(format!("Failed to read {}: {e}", path.display())))?;
            serde_json::from_str(&raw)
                .map_err(|e| BatchError::StoreError(format!("Corrupt store file {}: {e}", path.display())))?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            props: Mutex::new(props),
        })
    }

    fn persist(&self, props: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(props)?;
        fs::write(&self.path, raw)
            .map_err(|e| BatchError::StoreError(format!("Failed to write {}: {e}", self.path.display())))
    }
}

impl PropertyStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.props.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut props = self.props.lock();
        props.insert(key.to_string(), value.to_string());
        self.persist(&props)
    }

    fn set_all(&self, pairs: &[(&str, String)]) -> Result<()> {
        let mut props = self.props.lock();
        for (key, value) in pairs {
            props.insert((*key).to_string(), value.clone());
        }
        self.persist(&props)
    }

    fn delete_all(&self) -> Result<()> {
        let mut props = self.props.lock();
        props.clear();
        self.persist(&props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_round_trip() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("total_reviews", "7").unwrap();
        assert_eq!(store.get("total_reviews").unwrap().as_deref(), Some("7"));

        store.delete_all().unwrap();
        assert_eq!(store.get("total_reviews").unwrap(), None);
    }

    #[test]
    fn test_set_all_writes_every_pair() {
        let store = InMemoryStore::new();
        store
            .set_all(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_read_counter_defaults_to_zero() {
        let store = InMemoryStore::new();
        assert_eq!(read_counter(&store, "absent").unwrap(), 0);

        store.set("present", "41").unwrap();
        assert_eq!(read_counter(&store, "present").unwrap(), 41);

        store.set("garbage", "not-a-number").unwrap();
        assert!(read_counter(&store, "garbage").is_err());
    }

    #[test]
    fn test_json_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job_state.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("last_processed_index", "12").unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("last_processed_index").unwrap().as_deref(),
            Some("12")
        );
    }
}
