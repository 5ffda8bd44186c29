//! Persistence backends for serialized keystores
//!
//! The wallet controller treats storage as an opaque string store keyed by a
//! service identifier. Each backend only promises that a single
//! `get_item`/`set_item`/`remove_item` call succeeds or fails as a whole.
//!
//! # Available Backends
//!
//! - **file**: one file per item under a private directory (default)
//! - **memory**: process-local map, for tests and throwaway sessions

mod error;
pub mod file;
pub mod memory;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Files with owner-only permissions (0600 files in a 0700 directory)
    #[default]
    File,

    /// In-memory map, lost when the process exits
    Memory,
}

impl StoreBackend {
    /// Get all available backend names
    pub fn variants() -> &'static [&'static str] {
        &["file", "memory"]
    }

    /// Whether items survive a restart
    pub fn is_persistent(&self) -> bool {
        match self {
            StoreBackend::File => true,
            StoreBackend::Memory => false,
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::File => write!(f, "file"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(StoreError::InvalidBackend(s.to_string())),
        }
    }
}

/// Key-value string store for serialized keystores
pub trait SecureStore: Send + Sync {
    /// Read an item, `None` when absent
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write an item, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove an item. Removing a missing item is not an error.
    fn remove_item(&self, key: &str) -> StoreResult<()>;

    /// Get the backend type
    fn backend_type(&self) -> StoreBackend;
}

/// Open a store for `backend`
///
/// # Arguments
///
/// * `backend` - The backend type to use
/// * `base_path` - Directory for file-based backends
pub fn open_store(backend: StoreBackend, base_path: &Path) -> StoreResult<Arc<dyn SecureStore>> {
    let store: Arc<dyn SecureStore> = match backend {
        StoreBackend::File => Arc::new(FileStore::new(base_path)?),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Reject keys that cannot be mapped to a single file name
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
