//! Secret wrapper utilities for consistent secret handling
//!
//! Provides type aliases and utilities around the `secrecy` crate for
//! handling sensitive strings and byte arrays.

use secrecy::{SecretBox, SecretString as SecrecySecretString};
use zeroize::Zeroize;

/// A secret byte buffer that is zeroized on drop.
///
/// Box openings return this type so decrypted seeds and private keys never
/// sit in a plain `Vec<u8>`.
///
/// # Example
///
/// ```rust
/// use keyvault::secure::SecretBytes;
/// use secrecy::ExposeSecret;
///
/// let secret = SecretBytes::new(Box::new(vec![1, 2, 3, 4]));
/// assert_eq!(secret.expose_secret(), &vec![1, 2, 3, 4]);
/// ```
pub type SecretBytes = SecretBox<Vec<u8>>;

/// A secret string that is zeroized on drop.
///
/// Used for passwords and mnemonic phrases.
pub type SecretString = SecrecySecretString;

/// A fixed-size secret byte array.
///
/// Backs fixed-width secrets such as the 32-byte password-derived key.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SecretArray<const N: usize> {
    inner: [u8; N],
}

impl<const N: usize> SecretArray<N> {
    /// Create a new secret array from bytes.
    pub fn new(bytes: [u8; N]) -> Self {
        Self { inner: bytes }
    }

    /// Build from a slice, failing when the length is not exactly `N`.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let inner: [u8; N] = bytes.try_into().ok()?;
        Some(Self { inner })
    }

    /// Expose the secret bytes.
    ///
    /// The returned reference should not be stored.
    pub fn expose_secret(&self) -> &[u8; N] {
        &self.inner
    }
}

impl<const N: usize> std::fmt::Debug for SecretArray<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretArray")
            .field("length", &N)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Extension trait for creating secret values.
pub trait IntoSecret {
    /// The secret type this converts into.
    type Secret;

    /// Convert into a secret value.
    fn into_secret(self) -> Self::Secret;
}

impl IntoSecret for String {
    type Secret = SecretString;

    fn into_secret(self) -> Self::Secret {
        self.into()
    }
}

impl IntoSecret for Vec<u8> {
    type Secret = SecretBytes;

    fn into_secret(self) -> Self::Secret {
        SecretBox::new(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_array_from_slice() {
        let secret = SecretArray::<4>::from_slice(&[1, 2, 3, 4]).unwrap();
        assert_eq!(secret.expose_secret(), &[1, 2, 3, 4]);

        assert!(SecretArray::<4>::from_slice(&[1, 2, 3]).is_none());
        assert!(SecretArray::<4>::from_slice(&[1, 2, 3, 4, 5]).is_none());
    }

    #[test]
    fn test_secret_array_debug() {
        let secret = SecretArray::new([0xABu8; 32]);
        let debug = format!("{:?}", secret);

        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("length"));
        assert!(!debug.contains("171")); // 0xAB = 171
    }

    #[test]
    fn test_into_secret_string() {
        let secret = "correct horse".to_string().into_secret();
        let exposed: &str = secret.expose_secret();
        assert_eq!(exposed, "correct horse");
    }

    #[test]
    fn test_into_secret_bytes() {
        let secret = vec![9, 8, 7].into_secret();
        assert_eq!(secret.expose_secret(), &vec![9, 8, 7]);
    }
}
