//! Password-derived key service
//!
//! scrypt with a fixed work factor (log N = 14, r = 8, p = 1, 32 bytes)
//! turns a password and the keystore salt into the symmetric key that
//! guards every secret field.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::error::{KeystoreError, KeystoreResult};
use crate::secure::SecretArray;

/// scrypt CPU/memory cost as log2(N)
pub const SCRYPT_LOG_N: u8 = 14;
/// scrypt block size
pub const SCRYPT_R: u32 = 8;
/// scrypt parallelization
pub const SCRYPT_P: u32 = 1;
/// Derived key length in bytes
pub const SCRYPT_DKLEN: usize = 32;

/// Random salt length in bytes (before base64)
pub const SALT_LENGTH: usize = 32;

/// scrypt work factor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ScryptParams {
    /// log2 of the CPU/memory cost
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelization
    pub p: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            log_n: SCRYPT_LOG_N,
            r: SCRYPT_R,
            p: SCRYPT_P,
        }
    }
}

impl ScryptParams {
    /// Validate the parameters
    pub fn validate(&self) -> KeystoreResult<()> {
        if self.log_n == 0 || self.log_n >= 64 {
            return Err(KeystoreError::InvalidKdfParams(
                "log_n must be in 1..64".to_string(),
            ));
        }
        if self.r == 0 {
            return Err(KeystoreError::InvalidKdfParams(
                "r must be positive".to_string(),
            ));
        }
        if self.p == 0 {
            return Err(KeystoreError::InvalidKdfParams(
                "p must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Symmetric key derived from a password and salt
///
/// Never persisted. Cloning shares the same zeroize-on-drop buffer.
#[derive(Clone)]
pub struct DerivedKey(Arc<SecretArray<SCRYPT_DKLEN>>);

impl DerivedKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; SCRYPT_DKLEN]) -> Self {
        Self(Arc::new(SecretArray::new(bytes)))
    }

    /// Expose the key bytes
    pub fn expose_secret(&self) -> &[u8; SCRYPT_DKLEN] {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Something that turns (password, salt) into a [`DerivedKey`]
///
/// The wallet controller owns one of these; tests substitute a cheaper or
/// instrumented implementation.
pub trait KeyDerivation: Send + Sync {
    /// Derive the key. Deterministic for equal inputs.
    fn derive_key(&self, password: &str, salt: &str) -> KeystoreResult<DerivedKey>;
}

/// Production scrypt derivation
#[derive(Debug, Clone, Copy, Default)]
pub struct ScryptKdf {
    params: ScryptParams,
}

impl ScryptKdf {
    /// scrypt with explicit parameters
    pub fn new(params: ScryptParams) -> Self {
        Self { params }
    }

    /// Parameters in use
    pub fn params(&self) -> ScryptParams {
        self.params
    }
}

impl KeyDerivation for ScryptKdf {
    fn derive_key(&self, password: &str, salt: &str) -> KeystoreResult<DerivedKey> {
        scrypt_derive_key(password, salt, &self.params)
    }
}

/// Derive a key using scrypt
///
/// # Arguments
///
/// * `password` - User password
/// * `salt` - Keystore salt string (its UTF-8 bytes feed scrypt)
/// * `params` - Work factor
pub fn scrypt_derive_key(
    password: &str,
    salt: &str,
    params: &ScryptParams,
) -> KeystoreResult<DerivedKey> {
    params.validate()?;

    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, SCRYPT_DKLEN)
        .map_err(|e| KeystoreError::InvalidKdfParams(e.to_string()))?;

    let mut output = [0u8; SCRYPT_DKLEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &scrypt_params, &mut output)
        .map_err(|e| KeystoreError::KdfError(e.to_string()))?;

    let key = DerivedKey::from_bytes(output);
    output.zeroize();
    Ok(key)
}

/// Generate a random base64 salt
pub fn generate_salt() -> String {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    BASE64.encode(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> ScryptParams {
        ScryptParams {
            log_n: 10,
            ..ScryptParams::default()
        }
    }

    #[test]
    fn test_default_work_factor() {
        let params = ScryptParams::default();
        assert_eq!(params.log_n, 14);
        assert_eq!(params.r, 8);
        assert_eq!(params.p, 1);
    }

    #[test]
    fn test_scrypt_derive_key() {
        let salt = "c2FsdHNhbHRzYWx0";

        let derived = scrypt_derive_key("test-password", salt, &ScryptParams::default()).unwrap();
        assert_eq!(derived.expose_secret().len(), 32);

        // Same inputs produce same output
        let derived2 = scrypt_derive_key("test-password", salt, &ScryptParams::default()).unwrap();
        assert_eq!(derived.expose_secret(), derived2.expose_secret());

        // Different password produces different key
        let derived3 = scrypt_derive_key("different", salt, &ScryptParams::default()).unwrap();
        assert_ne!(derived.expose_secret(), derived3.expose_secret());
    }

    #[test]
    fn test_salt_changes_key() {
        let a = scrypt_derive_key("pw", "salt-a", &fast()).unwrap();
        let b = scrypt_derive_key("pw", "salt-b", &fast()).unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    fn test_params_validation() {
        assert!(ScryptParams::default().validate().is_ok());

        let zero_r = ScryptParams {
            r: 0,
            ..ScryptParams::default()
        };
        assert!(zero_r.validate().is_err());

        let zero_log_n = ScryptParams {
            log_n: 0,
            ..ScryptParams::default()
        };
        assert!(scrypt_derive_key("pw", "salt", &zero_log_n).is_err());
    }

    #[test]
    fn test_kdf_trait_matches_free_function() {
        let kdf = ScryptKdf::new(fast());
        let via_trait = kdf.derive_key("pw", "salt").unwrap();
        let direct = scrypt_derive_key("pw", "salt", &fast()).unwrap();
        assert_eq!(via_trait.expose_secret(), direct.expose_secret());
    }

    #[test]
    fn test_generate_salt() {
        let salt1 = generate_salt();
        let salt2 = generate_salt();

        assert_eq!(BASE64.decode(&salt1).unwrap().len(), SALT_LENGTH);
        assert_ne!(salt1, salt2);
    }

    #[test]
    fn test_derived_key_debug_redacted() {
        let key = DerivedKey::from_bytes([0xAB; 32]);
        assert_eq!(format!("{:?}", key), "DerivedKey([REDACTED])");
    }

    #[test]
    fn test_params_serialization() {
        let json = serde_json::to_string(&ScryptParams::default()).unwrap();
        assert_eq!(json, r#"{"log-n":14,"r":8,"p":1}"#);
    }
}
