//! Hierarchical deterministic key derivation
//!
//! The HD root is a BIP-32 extended private key at the vault's derivation
//! path. Per-address secrets are its non-hardened children `0, 1, 2, ...`,
//! each a 32-byte Ed25519 signing seed.
//!
//! The alternate root key comes from a separately formatted mnemonic and is
//! turned into an Ed25519 master secret with SLIP-0010.

use std::str::FromStr;

use bip32::{ChildNumber, DerivationPath, Prefix, XPrv};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroize;

use super::error::{MnemonicError, MnemonicResult};
use super::generate::Mnemonic;
use crate::secure::{SecretArray, SecretString};

/// Default derivation path for the HD root key
pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0";

/// Length of a normalized private key
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Shortest derived private key accepted before padding
pub const MIN_PRIVATE_KEY_LENGTH: usize = 16;

/// SLIP-0010 HMAC key for the Ed25519 curve
const SLIP10_ED25519_KEY: &[u8] = b"ed25519 seed";

/// BIP-32 root key at the vault's derivation path
pub struct HdRootKey(XPrv);

impl HdRootKey {
    /// Derive the root key for `hd_path` from a mnemonic
    pub fn from_mnemonic(mnemonic: &Mnemonic, hd_path: &str) -> MnemonicResult<Self> {
        let path = parse_hd_path(hd_path)?;
        let mut seed = mnemonic.to_seed();
        let root = XPrv::derive_from_path(seed, &path);
        seed.zeroize();
        Ok(Self(root?))
    }

    /// Restore from the serialized `xprv...` form
    pub fn from_xprv(xprv: &str) -> MnemonicResult<Self> {
        XPrv::from_str(xprv.trim())
            .map(Self)
            .map_err(|e| MnemonicError::DerivationFailed(e.to_string()))
    }

    /// Serialized `xprv...` form, for encryption at rest
    pub fn to_xprv(&self) -> SecretString {
        let encoded = self.0.to_string(Prefix::XPRV);
        encoded.as_str().to_string().into()
    }

    /// Derive the normalized 32-byte signing seed at child `index`
    pub fn derive_child_seed(&self, index: u32) -> MnemonicResult<SecretArray<PRIVATE_KEY_LENGTH>> {
        let child_number = ChildNumber::new(index, false)?;
        let child = self.0.derive_child(child_number)?;
        let mut bytes = child.to_bytes();
        let normalized = normalize_private_key(&bytes);
        bytes.zeroize();
        normalized
    }
}

impl std::fmt::Debug for HdRootKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdRootKey")
            .field("depth", &self.0.attrs().depth)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Parse a BIP-32 derivation path such as `m/44'/60'/0'/0`
pub fn parse_hd_path(path: &str) -> MnemonicResult<DerivationPath> {
    DerivationPath::from_str(path.trim())
        .map_err(|e| MnemonicError::InvalidPath(format!("{}: {}", path, e)))
}

/// Ed25519 master secret for a mnemonic (SLIP-0010)
pub fn derive_root_signing_seed(
    mnemonic: &Mnemonic,
) -> MnemonicResult<SecretArray<PRIVATE_KEY_LENGTH>> {
    let mut seed = mnemonic.to_seed();
    let mut mac = Hmac::<Sha512>::new_from_slice(SLIP10_ED25519_KEY)
        .map_err(|e| MnemonicError::DerivationFailed(e.to_string()))?;
    mac.update(&seed);
    seed.zeroize();

    let output = mac.finalize().into_bytes();
    SecretArray::from_slice(&output[..PRIVATE_KEY_LENGTH])
        .ok_or_else(|| MnemonicError::DerivationFailed("short HMAC output".to_string()))
}

/// Left-pad a private key to 32 bytes
///
/// # Errors
///
/// `InvalidPrivateKeyLength` when the key is shorter than 16 or longer than
/// 32 bytes. Both indicate a derivation bug and are not recoverable.
pub fn normalize_private_key(bytes: &[u8]) -> MnemonicResult<SecretArray<PRIVATE_KEY_LENGTH>> {
    if bytes.len() > PRIVATE_KEY_LENGTH || bytes.len() < MIN_PRIVATE_KEY_LENGTH {
        return Err(MnemonicError::InvalidPrivateKeyLength(bytes.len()));
    }

    let mut padded = [0u8; PRIVATE_KEY_LENGTH];
    padded[PRIVATE_KEY_LENGTH - bytes.len()..].copy_from_slice(bytes);
    let secret = SecretArray::new(padded);
    padded.zeroize();
    Ok(secret)
}

/// Hex form of a signing seed, used when exporting keys
pub fn seed_to_hex(seed: &SecretArray<PRIVATE_KEY_LENGTH>) -> SecretString {
    hex::encode(seed.expose_secret()).into()
}
