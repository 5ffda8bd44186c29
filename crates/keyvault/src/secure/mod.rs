//! Secure memory handling for secret material
//!
//! Every plaintext the vault handles (mnemonics, root keys, per-address
//! private keys, password-derived keys) lives in one of these containers:
//! - zeroed on drop via `zeroize`
//! - `Debug` prints `[REDACTED]`
//! - no accidental `Clone` of raw buffers

mod secret;

pub use secret::{IntoSecret, SecretArray, SecretBytes, SecretString};

// Re-export for convenience
pub use secrecy::ExposeSecret;
