//! Envelope error types

use thiserror::Error;

use crate::keystore::KeystoreError;
use crate::sealed::BoxError;

/// Errors from the encryption engine
#[derive(Error, Debug)]
pub enum EnvelopeError {
    /// `multi_encrypt` called without recipients
    #[error("recipient list is empty")]
    EmptyRecipientList,

    /// Envelope version or algorithm tags this build does not handle
    #[error("unsupported envelope: {0}")]
    UnsupportedEnvelope(String),

    /// Base64 or UTF-8 decoding failure
    #[error("envelope encoding error: {0}")]
    Encoding(String),

    /// Keystore access failed (wrong derived key, unknown index)
    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    /// Box primitive failure other than a key mismatch
    #[error("box operation failed: {0}")]
    Box(#[from] BoxError),
}

/// Result type for envelope operations
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
