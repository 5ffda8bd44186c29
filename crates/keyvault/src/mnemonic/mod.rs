//! Mnemonic phrases and HD key derivation
//!
//! # Derivation
//!
//! ```text
//! phrase --BIP-39--> seed --BIP-32 @ hd_path--> HD root (xprv)
//! HD root --child i (non-hardened)--> 32-byte Ed25519 signing seed
//! alternate phrase --BIP-39 + SLIP-0010--> root Ed25519 signing seed
//! ```
//!
//! The same phrase and path always reproduce the same addresses.

mod derive;
mod error;
mod generate;

pub use bip39::Language;
pub use derive::{
    derive_root_signing_seed, normalize_private_key, parse_hd_path, seed_to_hex, HdRootKey,
    DEFAULT_HD_PATH, MIN_PRIVATE_KEY_LENGTH, PRIVATE_KEY_LENGTH,
};
pub use error::{MnemonicError, MnemonicResult};
pub use generate::{Mnemonic, WordsParams};
