//! Password-protected HD keystore
//!
//! - [`kdf`]: scrypt password derivation into a [`DerivedKey`]
//! - [`Keystore`]: encrypted mnemonic, HD root, per-address keys and an
//!   optional alternate root key, all under one derived key
//! - serialization with a schema version gate on load
//!
//! # Example
//!
//! ```rust,ignore
//! use keyvault::keystore::{Keystore, ScryptKdf};
//!
//! let kdf = ScryptKdf::default();
//! let (mut keystore, derived_key) =
//!     Keystore::create_vault("password", &phrase, "m/44'/60'/0'/0", &kdf)?;
//! keystore.generate_new_keys(&derived_key, 2)?;
//!
//! let json = keystore.serialize()?;
//! let restored = Keystore::deserialize(&json)?.expect("current version");
//! ```

mod error;
mod format;
pub mod kdf;
mod vault;

pub use error::{KeystoreError, KeystoreResult};
pub use format::{SchemaVersion, CURRENT_VERSION, DROPPED_VERSION};
pub use kdf::{
    generate_salt, scrypt_derive_key, DerivedKey, KeyDerivation, ScryptKdf, ScryptParams,
};
pub use vault::{Keystore, KeystoreBuilder};
