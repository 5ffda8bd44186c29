//! Store error types

use std::io;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a persistence backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Invalid backend name
    #[error("invalid store backend: {0}. Valid options: file, memory")]
    InvalidBackend(String),

    /// Item key cannot be used by this backend
    #[error("invalid item key: {0:?}")]
    InvalidKey(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}
