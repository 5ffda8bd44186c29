//! Authenticated box encryption
//!
//! Two primitives share the same output shape, a [`SealedBox`]:
//!
//! - [`symmetric`]: XChaCha20-Poly1305 under a 32-byte key with a fresh
//!   random 24-byte nonce per call
//! - [`asymmetric`]: X25519 key agreement between a local box keypair
//!   (derived from an Ed25519 signing seed) and a counterparty public key,
//!   HKDF-SHA256 into an XChaCha20-Poly1305 key
//!
//! Opening with the wrong key yields [`BoxError::AuthenticationFailed`],
//! which callers branch on instead of treating as a hard failure.

pub mod asymmetric;
mod error;
pub mod symmetric;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub use asymmetric::{BoxKeyPair, BoxPublicKey};
pub use error::{BoxError, BoxResult, OptionalOpen};
pub use symmetric::{KEY_LENGTH, NONCE_LENGTH};

/// Ciphertext plus the nonce it was sealed under
#[derive(Clone, PartialEq, Eq)]
pub struct SealedBox {
    /// AEAD output (ciphertext || 16-byte tag)
    pub ciphertext: Vec<u8>,
    /// Random nonce, unique per seal
    pub nonce: [u8; NONCE_LENGTH],
}

impl SealedBox {
    /// Rebuild from base64 encoded parts
    pub fn from_base64(ciphertext: &str, nonce: &str) -> BoxResult<Self> {
        let ciphertext = BASE64
            .decode(ciphertext)
            .map_err(|e| BoxError::Encoding(format!("ciphertext: {}", e)))?;
        let nonce_bytes = BASE64
            .decode(nonce)
            .map_err(|e| BoxError::Encoding(format!("nonce: {}", e)))?;
        let nonce: [u8; NONCE_LENGTH] =
            nonce_bytes
                .as_slice()
                .try_into()
                .map_err(|_| BoxError::InvalidNonceLength {
                    expected: NONCE_LENGTH,
                    actual: nonce_bytes.len(),
                })?;

        Ok(Self { ciphertext, nonce })
    }

    /// Base64 encoding of the ciphertext
    pub fn ciphertext_base64(&self) -> String {
        BASE64.encode(&self.ciphertext)
    }

    /// Base64 encoding of the nonce
    pub fn nonce_base64(&self) -> String {
        BASE64.encode(self.nonce)
    }
}

impl std::fmt::Debug for SealedBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedBox")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("nonce", &hex::encode(self.nonce))
            .finish()
    }
}
