//! Signing key error types

use thiserror::Error;

/// Ed25519 key handling errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid secret key bytes
    #[error("invalid secret key bytes")]
    InvalidSecretKey,

    /// Invalid public key bytes
    #[error("invalid public key bytes")]
    InvalidPublicKey,

    /// Invalid hex encoding
    #[error("invalid hex encoding: {0}")]
    HexError(String),
}
