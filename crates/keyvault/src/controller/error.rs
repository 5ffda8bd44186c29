//! Wallet controller error types

use thiserror::Error;

use crate::keystore::KeystoreError;
use crate::storage::StoreError;

/// Errors from the wallet controller
#[derive(Error, Debug)]
pub enum WalletError {
    /// No keystore is loaded
    #[error("no wallet found")]
    NoWallet,

    /// A keystore is already loaded
    #[error("a wallet already exists for this service")]
    WalletExists,

    /// The password prompt was dismissed without a password
    #[error("password prompt cancelled")]
    Cancelled,

    /// Invalid wallet configuration
    #[error("invalid wallet configuration: {0}")]
    InvalidConfig(String),

    /// Password validation could not run (KDF failure, task aborted)
    #[error("password validation failed: {0}")]
    Validation(String),

    /// Keystore operation failed
    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    /// Persistence backend failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WalletError {
    /// The user dismissed the prompt
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WalletError::Cancelled)
    }

    /// The stored keystore must be migrated before use
    pub fn is_needs_upgrade(&self) -> bool {
        matches!(
            self,
            WalletError::Keystore(KeystoreError::NeedsUpgrade { .. })
        )
    }
}

/// Result type for wallet controller operations
pub type WalletResult<T> = Result<T, WalletError>;
