//! XChaCha20-Poly1305 symmetric box
//!
//! Seals arbitrary byte strings under a 32-byte key. Every call to [`seal`]
//! draws a fresh random 24-byte nonce, which is stored next to the
//! ciphertext. The extended nonce is large enough that random generation
//! never needs coordination between callers.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;

use super::error::{BoxError, BoxResult};
use super::SealedBox;
use crate::secure::{IntoSecret, SecretArray, SecretBytes};

/// Symmetric key length in bytes
pub const KEY_LENGTH: usize = 32;

/// XChaCha20 nonce length in bytes
pub const NONCE_LENGTH: usize = 24;

/// Poly1305 tag length in bytes
pub const TAG_LENGTH: usize = 16;

/// Generate a random 256-bit symmetric key
pub fn generate_key() -> SecretArray<KEY_LENGTH> {
    let mut key = [0u8; KEY_LENGTH];
    rand::thread_rng().fill_bytes(&mut key);
    SecretArray::new(key)
}

/// Generate a random nonce
pub fn generate_nonce() -> [u8; NONCE_LENGTH] {
    let mut nonce = [0u8; NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

fn cipher_for(key: &[u8]) -> BoxResult<XChaCha20Poly1305> {
    XChaCha20Poly1305::new_from_slice(key).map_err(|_| BoxError::InvalidKeyLength {
        expected: KEY_LENGTH,
        actual: key.len(),
    })
}

/// Seal a plaintext under a symmetric key
///
/// # Arguments
///
/// * `plaintext` - Bytes to protect
/// * `key` - 32-byte symmetric key
///
/// # Returns
///
/// The ciphertext together with the freshly generated nonce
pub fn seal(plaintext: &[u8], key: &[u8]) -> BoxResult<SealedBox> {
    let cipher = cipher_for(key)?;
    let nonce = generate_nonce();

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| BoxError::EncryptionFailed)?;

    Ok(SealedBox { ciphertext, nonce })
}

/// Open a sealed box with a symmetric key
///
/// # Returns
///
/// The plaintext, or [`BoxError::AuthenticationFailed`] when the key does
/// not match (or the box was tampered with)
pub fn open(sealed: &SealedBox, key: &[u8]) -> BoxResult<SecretBytes> {
    let cipher = cipher_for(key)?;

    let plaintext = cipher
        .decrypt(XNonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
        .map_err(|_| BoxError::AuthenticationFailed)?;

    Ok(plaintext.into_secret())
}
