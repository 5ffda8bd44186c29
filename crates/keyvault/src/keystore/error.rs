//! Keystore error types

use thiserror::Error;

use crate::mnemonic::MnemonicError;
use crate::sealed::BoxError;

/// Errors that can occur during keystore operations
#[derive(Error, Debug)]
pub enum KeystoreError {
    /// Mnemonic failed word list or checksum validation
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// The derived key does not open this keystore (wrong password)
    #[error("incorrect derived key: password does not match this keystore")]
    IncorrectDerivedKey,

    /// No private key is stored for the requested address or index
    #[error("address not found in keystore: {0}")]
    AddressNotFound(String),

    /// A required root key field is absent
    #[error("missing root key material: {0}")]
    MissingRootKey(&'static str),

    /// Serialized keystore uses an older schema that must be migrated
    #[error("keystore version {found} needs upgrade to version {current}")]
    NeedsUpgrade { found: u32, current: u32 },

    /// Serialized keystore is newer than this build understands
    #[error("unsupported keystore version {0}")]
    UnsupportedVersion(u32),

    /// A field failed to open under an already validated key, or the
    /// serialized field set violates the keystore invariants
    #[error("corrupted keystore field: {0}")]
    CorruptedField(String),

    /// Invalid KDF parameters
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    /// Key derivation failed
    #[error("key derivation failed: {0}")]
    KdfError(String),

    /// HD derivation failure (fatal)
    #[error(transparent)]
    Derivation(#[from] MnemonicError),

    /// Box primitive failure other than a key mismatch
    #[error("cipher operation failed: {0}")]
    Cipher(#[from] BoxError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl KeystoreError {
    /// True when the caller should re-prompt for the password
    pub fn is_wrong_password(&self) -> bool {
        matches!(self, KeystoreError::IncorrectDerivedKey)
    }
}

/// Result type for keystore operations
pub type KeystoreResult<T> = Result<T, KeystoreError>;
