//! Password-protected HD key vault
//!
//! This crate provides:
//! - scrypt password derivation and XChaCha20-Poly1305 symmetric boxes
//! - X25519 asymmetric boxes keyed from Ed25519 signing seeds
//! - [`Keystore`]: encrypted mnemonic, BIP-32 HD root and per-address keys
//!   under one password-derived key, with versioned serialization
//! - multi-recipient envelope encryption on top of the keystore
//! - [`WalletController`]: cached, coalesced password validation with a
//!   retry prompt loop, and persistence through a [`SecureStore`]

pub mod config;
pub mod controller;
pub mod ed25519;
pub mod envelope;
pub mod error;
pub mod keystore;
pub mod mnemonic;
pub mod sealed;
pub mod secure;
pub mod storage;

// Ed25519 exports
pub use ed25519::{Ed25519PublicKey, Ed25519SecretKey, Ed25519Signature, SignKeys};

// Error exports
pub use error::CryptoError;

// Secure memory exports
pub use secure::{ExposeSecret, IntoSecret, SecretArray, SecretBytes, SecretString};

// Box exports
pub use sealed::{BoxError, BoxKeyPair, BoxPublicKey, BoxResult, OptionalOpen, SealedBox};

// Keystore exports
pub use keystore::{
    DerivedKey, KeyDerivation, Keystore, KeystoreBuilder, KeystoreError, KeystoreResult,
    ScryptKdf, ScryptParams,
};

// Mnemonic exports
pub use mnemonic::{Language, Mnemonic, MnemonicError, WordsParams, DEFAULT_HD_PATH};

// Envelope exports
pub use envelope::{
    asym_decrypt_string, asym_encrypt_string, multi_decrypt, multi_encrypt, public_encrypt_key,
    EncryptedEnvelope, EncryptedPayload, EnvelopeError, EnvelopeResult,
};

// Store exports
pub use storage::{open_store, FileStore, MemoryStore, SecureStore, StoreBackend, StoreError};

// Controller exports
pub use config::WalletConfig;
pub use controller::{
    PasswordPrompt, PromptContext, PromptState, ScriptedPrompt, Validation, WalletController,
    WalletError, WalletResult,
};
