//! Box primitive error types

use thiserror::Error;

/// Result type for box operations
pub type BoxResult<T> = Result<T, BoxError>;

/// Errors produced by the symmetric and asymmetric boxes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoxError {
    /// The ciphertext does not authenticate under the supplied key(s).
    ///
    /// This is the expected outcome of a wrong password or a non-matching
    /// counterparty key, not a corruption signal.
    #[error("authentication failed: ciphertext does not open under this key")]
    AuthenticationFailed,

    /// Key has the wrong length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Nonce has the wrong length
    #[error("invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    /// Public key is not a usable curve point
    #[error("invalid public key")]
    InvalidPublicKey,

    /// The AEAD refused to encrypt
    #[error("encryption failed")]
    EncryptionFailed,

    /// Base64 or hex decoding failed
    #[error("invalid encoding: {0}")]
    Encoding(String),
}

impl BoxError {
    /// True for the soft "wrong key" outcome
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, BoxError::AuthenticationFailed)
    }
}

/// Converts the soft "wrong key" failure into `Ok(None)`.
///
/// Callers that try several candidate keys use this to treat mismatches as
/// data while still propagating real errors.
pub trait OptionalOpen<T> {
    /// `Ok(Some(v))` on success, `Ok(None)` on authentication failure.
    fn optional(self) -> BoxResult<Option<T>>;
}

impl<T> OptionalOpen<T> for BoxResult<T> {
    fn optional(self) -> BoxResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(BoxError::AuthenticationFailed) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
