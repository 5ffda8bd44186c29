//! In-memory store backend
//!
//! Items live in a map for the lifetime of the store. Used by tests and by
//! sessions that should leave nothing on disk.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::error::StoreResult;
use super::{validate_key, SecureStore, StoreBackend};

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl SecureStore for MemoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.items.write().remove(key);
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}
