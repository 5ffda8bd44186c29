//! X25519 public-key box
//!
//! Each vault address owns exactly one 32-byte secret, the Ed25519 signing
//! seed. The box keypair is derived from that same seed: the X25519 secret
//! scalar is the clamped first half of `SHA-512(seed)`, which makes the box
//! public key the Montgomery form of the Ed25519 public key.
//!
//! Sealing runs X25519 between the local secret and the counterparty public
//! key, stretches the shared secret with HKDF-SHA256, and seals with the
//! symmetric box. The agreement is symmetric, so the recipient opens with
//! its own keypair and the sender's public key.

use curve25519_dalek::edwards::CompressedEdwardsY;
use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroize;

use super::error::{BoxError, BoxResult};
use super::symmetric::{self, KEY_LENGTH};
use super::SealedBox;
use crate::secure::{SecretArray, SecretBytes};

/// HKDF info string binding derived keys to this box construction
const BOX_KDF_INFO: &[u8] = b"keyvault-box-x25519-xchacha20poly1305-v1";

/// Public key length in bytes
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// X25519 public key usable as a box recipient
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxPublicKey([u8; PUBLIC_KEY_LENGTH]);

impl BoxPublicKey {
    /// Wrap raw X25519 public key bytes
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0
    }

    /// Convert an Ed25519 public key (for example a vault address) into the
    /// matching box public key
    pub fn from_ed25519(ed25519_public: &[u8; PUBLIC_KEY_LENGTH]) -> BoxResult<Self> {
        let point = CompressedEdwardsY(*ed25519_public)
            .decompress()
            .ok_or(BoxError::InvalidPublicKey)?;
        Ok(Self(point.to_montgomery().to_bytes()))
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex
    pub fn from_hex(s: &str) -> BoxResult<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| BoxError::Encoding(e.to_string()))?;
        let arr: [u8; PUBLIC_KEY_LENGTH] =
            bytes.as_slice().try_into().map_err(|_| BoxError::InvalidKeyLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for BoxPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoxPublicKey({})", hex::encode(&self.0[..8]))
    }
}

impl std::fmt::Display for BoxPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for BoxPublicKey {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for BoxPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BoxPublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Box keypair derived from an Ed25519 signing seed
pub struct BoxKeyPair {
    secret: StaticSecret,
    public: BoxPublicKey,
}

impl BoxKeyPair {
    /// Derive the box keypair from a 32-byte Ed25519 signing seed
    pub fn from_signing_seed(seed: &[u8; 32]) -> Self {
        let digest = Sha512::digest(seed);
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&digest[..32]);

        // clamping happens inside x25519
        let secret = StaticSecret::from(scalar);
        scalar.zeroize();

        let public = BoxPublicKey(X25519PublicKey::from(&secret).to_bytes());
        Self { secret, public }
    }

    /// The shareable half of the keypair
    pub fn public_key(&self) -> BoxPublicKey {
        self.public
    }

    fn shared_key(&self, their_public: &BoxPublicKey) -> BoxResult<SecretArray<KEY_LENGTH>> {
        let shared = self
            .secret
            .diffie_hellman(&X25519PublicKey::from(their_public.0));

        if !shared.was_contributory() {
            return Err(BoxError::InvalidPublicKey);
        }

        let hk = Hkdf::<Sha256>::new(None, shared.as_bytes());
        let mut okm = [0u8; KEY_LENGTH];
        hk.expand(BOX_KDF_INFO, &mut okm)
            .map_err(|_| BoxError::InvalidKeyLength {
                expected: KEY_LENGTH,
                actual: okm.len(),
            })?;

        let key = SecretArray::new(okm);
        okm.zeroize();
        Ok(key)
    }
}

impl std::fmt::Debug for BoxKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxKeyPair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Seal a plaintext from `my_keys` to `their_public`
///
/// # Arguments
///
/// * `plaintext` - Bytes to protect
/// * `my_keys` - Sender box keypair
/// * `their_public` - Recipient box public key
pub fn seal(
    plaintext: &[u8],
    my_keys: &BoxKeyPair,
    their_public: &BoxPublicKey,
) -> BoxResult<SealedBox> {
    let key = my_keys.shared_key(their_public)?;
    symmetric::seal(plaintext, key.expose_secret())
}

/// Open a box sealed between `my_keys` and `their_public`
///
/// A counterparty key that does not match yields
/// [`BoxError::AuthenticationFailed`].
pub fn open(
    sealed: &SealedBox,
    my_keys: &BoxKeyPair,
    their_public: &BoxPublicKey,
) -> BoxResult<SecretBytes> {
    let key = my_keys.shared_key(their_public)?;
    symmetric::open(sealed, key.expose_secret())
}
