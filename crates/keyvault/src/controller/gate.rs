//! Coalesced password validation
//!
//! The KDF is deliberately slow, so concurrent validations of the same
//! password against the same salt share one derivation. The first caller
//! runs it on the blocking pool; later callers wait on a oneshot channel and
//! receive a clone of the same outcome.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tokio::sync::oneshot;
use tracing::debug;
use zeroize::Zeroizing;

use super::error::{WalletError, WalletResult};
use crate::keystore::{DerivedKey, KeyDerivation, Keystore};

/// Outcome of checking a password against a keystore
#[derive(Debug, Clone)]
pub enum Validation {
    /// The password opens the keystore
    Valid(DerivedKey),
    /// Wrong password
    Invalid,
}

type SharedOutcome = Result<Validation, String>;
type RequestTag = [u8; 32];

/// Single-flight password validator
pub struct PasswordGate {
    kdf: Arc<dyn KeyDerivation>,
    in_flight: Mutex<HashMap<RequestTag, Vec<oneshot::Sender<SharedOutcome>>>>,
}

impl PasswordGate {
    /// Gate over `kdf`
    pub fn new(kdf: Arc<dyn KeyDerivation>) -> Self {
        Self {
            kdf,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct validations currently running
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Validate `password` against `keystore`
    ///
    /// Callers racing on the same (salt, password) pair observe one KDF run
    /// and one identical outcome.
    pub async fn validate(&self, password: &str, keystore: Keystore) -> WalletResult<Validation> {
        let tag = request_tag(keystore.salt(), password);

        let waiter = {
            let mut in_flight = self.in_flight.lock();
            match in_flight.get_mut(&tag) {
                Some(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    in_flight.insert(tag, Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            debug!("Joining in-flight password validation");
            return match rx.await {
                Ok(outcome) => outcome.map_err(WalletError::Validation),
                Err(_) => Err(WalletError::Validation(
                    "validation was abandoned".to_string(),
                )),
            };
        }

        let mut guard = InFlightGuard {
            gate: self,
            tag,
            armed: true,
        };

        let kdf = Arc::clone(&self.kdf);
        let password = Zeroizing::new(password.to_string());
        let joined = tokio::task::spawn_blocking(move || {
            let derived_key = kdf.derive_key(&password, keystore.salt())?;
            Ok::<_, crate::keystore::KeystoreError>(
                if keystore.is_derived_key_correct(&derived_key) {
                    Validation::Valid(derived_key)
                } else {
                    Validation::Invalid
                },
            )
        })
        .await;

        let outcome: SharedOutcome = match joined {
            Ok(Ok(validation)) => Ok(validation),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        guard.armed = false;
        let waiters = self.in_flight.lock().remove(&tag).unwrap_or_default();
        debug!(waiters = waiters.len(), "Password validation finished");
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }

        outcome.map_err(WalletError::Validation)
    }
}

impl std::fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGate")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Drops the pending entry if the leading caller is cancelled, so waiters
/// see a closed channel instead of hanging.
struct InFlightGuard<'a> {
    gate: &'a PasswordGate,
    tag: RequestTag,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.gate.in_flight.lock().remove(&self.tag);
        }
    }
}

fn request_tag(salt: &str, password: &str) -> RequestTag {
    let mut hasher = Sha256::new();
    hasher.update((salt.len() as u64).to_le_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
