//! Error types for mnemonic operations

use thiserror::Error;

/// Result type for mnemonic operations
pub type MnemonicResult<T> = Result<T, MnemonicError>;

/// Errors that can occur during mnemonic operations
#[derive(Debug, Error)]
pub enum MnemonicError {
    /// Invalid mnemonic phrase (unknown words or bad checksum)
    #[error("invalid mnemonic phrase: {0}")]
    InvalidPhrase(String),

    /// Word count differs from the requested word list parameters
    #[error("mnemonic has {actual} words, expected {expected}")]
    WordCountMismatch { expected: usize, actual: usize },

    /// Key derivation failed
    #[error("key derivation failed: {0}")]
    DerivationFailed(String),

    /// Invalid derivation path
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    /// Derived private key outside the accepted 16..=32 byte range
    #[error("derived private key has invalid length {0} (must be 16..=32 bytes)")]
    InvalidPrivateKeyLength(usize),
}

impl From<bip39::Error> for MnemonicError {
    fn from(err: bip39::Error) -> Self {
        MnemonicError::InvalidPhrase(err.to_string())
    }
}

impl From<bip32::Error> for MnemonicError {
    fn from(err: bip32::Error) -> Self {
        MnemonicError::DerivationFailed(err.to_string())
    }
}
