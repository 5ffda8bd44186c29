//! Wallet controller and password gate
//!
//! [`WalletController`] is the handle the application passes to every
//! operation that needs wallet access. It owns the keystore, persists it
//! through a [`SecureStore`], and turns user passwords into validated
//! derived keys:
//!
//! - a cached derived key is reused until it stops opening the keystore or a
//!   caller forces a prompt
//! - only one password prompt is shown at a time
//! - concurrent validations of the same password share one KDF run
//! - a wrong password re-prompts until the user gets it right or cancels
//!
//! Prompt transitions are published on a broadcast channel:
//!
//! ```text
//! AwaitingPassword -> Validating -> Accepted
//!                                -> Rejected -> AwaitingPassword
//! AwaitingPassword -> Cancelled
//! ```
//!
//! Keystore mutations run under one async mutex, so key generation,
//! password rotation and root key import never interleave.

mod error;
mod gate;
mod prompt;

use std::sync::Arc;

use parking_lot::Mutex as SyncMutex;
use secrecy::ExposeSecret;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

pub use error::{WalletError, WalletResult};
pub use gate::{PasswordGate, Validation};
pub use prompt::{PasswordPrompt, PromptContext, PromptState, ScriptedPrompt};

use crate::config::WalletConfig;
use crate::keystore::{
    DerivedKey, KeyDerivation, Keystore, KeystoreBuilder, KeystoreResult, ScryptKdf,
};
use crate::mnemonic::WordsParams;
use crate::secure::SecretString;
use crate::storage::SecureStore;

/// Capacity of the prompt state channel
const STATE_CHANNEL_CAPACITY: usize = 32;

/// Owner of one wallet's keystore and password flow
pub struct WalletController {
    config: WalletConfig,
    store: Arc<dyn SecureStore>,
    prompt: Arc<dyn PasswordPrompt>,
    kdf: Arc<dyn KeyDerivation>,
    gate: PasswordGate,
    keystore: Mutex<Option<Keystore>>,
    cached_key: SyncMutex<Option<DerivedKey>>,
    prompting: Mutex<()>,
    states: broadcast::Sender<PromptState>,
}

impl WalletController {
    /// Controller using scrypt with the configured work factor
    pub fn new(
        config: WalletConfig,
        store: Arc<dyn SecureStore>,
        prompt: Arc<dyn PasswordPrompt>,
    ) -> Self {
        let kdf: Arc<dyn KeyDerivation> = Arc::new(ScryptKdf::new(config.scrypt));
        Self::with_key_derivation(config, store, prompt, kdf)
    }

    /// Controller using a custom key derivation
    pub fn with_key_derivation(
        config: WalletConfig,
        store: Arc<dyn SecureStore>,
        prompt: Arc<dyn PasswordPrompt>,
        kdf: Arc<dyn KeyDerivation>,
    ) -> Self {
        let (states, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            config,
            store,
            prompt,
            gate: PasswordGate::new(Arc::clone(&kdf)),
            kdf,
            keystore: Mutex::new(None),
            cached_key: SyncMutex::new(None),
            prompting: Mutex::new(()),
            states,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Subscribe to prompt state transitions
    pub fn subscribe(&self) -> broadcast::Receiver<PromptState> {
        self.states.subscribe()
    }

    fn emit(&self, state: PromptState) {
        debug!(?state, "Prompt state");
        // No subscribers is fine
        let _ = self.states.send(state);
    }

    /// Load the keystore from the store
    ///
    /// Returns `false` when nothing is stored or the stored version is too
    /// old to read. A keystore that needs migration is reported as
    /// [`WalletError::is_needs_upgrade`]. On any error no keystore stays
    /// loaded.
    pub async fn load(&self) -> WalletResult<bool> {
        let mut guard = self.keystore.lock().await;
        self.clear_cached_key();
        // A failed load must not leave the previous keystore behind
        *guard = None;

        let Some(json) = self.store.get_item(&self.config.service)? else {
            return Ok(false);
        };

        let loaded = Keystore::deserialize(&json)?;
        let found = loaded.is_some();
        if !found {
            warn!(service = %self.config.service, "Stored keystore is no longer readable");
        }
        *guard = loaded;
        Ok(found)
    }

    /// Persist the loaded keystore
    pub async fn save(&self) -> WalletResult<()> {
        let guard = self.keystore.lock().await;
        let keystore = guard.as_ref().ok_or(WalletError::NoWallet)?;
        self.persist(keystore)
    }

    fn persist(&self, keystore: &Keystore) -> WalletResult<()> {
        let json = keystore.serialize()?;
        self.store.set_item(&self.config.service, &json)?;
        debug!(service = %self.config.service, "Persisted keystore");
        Ok(())
    }

    /// Whether a keystore is loaded
    pub async fn has_wallet(&self) -> bool {
        self.keystore.lock().await.is_some()
    }

    /// Create, persist and unlock a new wallet
    ///
    /// Returns the first derived address.
    pub async fn create_wallet(
        &self,
        password: &SecretString,
        mnemonic: &SecretString,
        words_params: Option<WordsParams>,
    ) -> WalletResult<String> {
        let mut guard = self.keystore.lock().await;
        if guard.is_some() {
            return Err(WalletError::WalletExists);
        }

        let mut builder = KeystoreBuilder::new(password.expose_secret(), mnemonic.expose_secret())
            .hd_path(&self.config.hd_path);
        if let Some(params) = words_params {
            builder = builder.words_params(params);
        }

        let kdf = Arc::clone(&self.kdf);
        let (keystore, derived_key) = run_blocking(move || builder.build(kdf.as_ref())).await?;

        self.persist(&keystore)?;
        let address = keystore
            .addresses()
            .first()
            .cloned()
            .ok_or(WalletError::NoWallet)?;
        *guard = Some(keystore);
        *self.cached_key.lock() = Some(derived_key);

        info!(service = %self.config.service, %address, "Created wallet");
        Ok(address)
    }

    /// Remove the wallet from memory and from the store
    pub async fn delete_wallet(&self) -> WalletResult<()> {
        let mut guard = self.keystore.lock().await;
        self.store.remove_item(&self.config.service)?;
        *guard = None;
        self.clear_cached_key();
        info!(service = %self.config.service, "Deleted wallet");
        Ok(())
    }

    /// Forget the cached derived key
    pub fn clear_cached_key(&self) {
        self.cached_key.lock().take();
    }

    /// Cached key, if it still opens the loaded keystore
    async fn cached_valid_key(&self) -> WalletResult<Option<DerivedKey>> {
        let Some(cached) = self.cached_key.lock().clone() else {
            return Ok(None);
        };

        let guard = self.keystore.lock().await;
        let keystore = guard.as_ref().ok_or(WalletError::NoWallet)?;
        if keystore.is_derived_key_correct(&cached) {
            Ok(Some(cached))
        } else {
            debug!("Cached derived key is stale");
            self.clear_cached_key();
            Ok(None)
        }
    }

    /// Check a password, sharing the KDF run with concurrent callers
    ///
    /// A correct password replaces the cached key; a wrong one clears it.
    pub async fn validate(&self, password: &SecretString) -> WalletResult<Validation> {
        let snapshot = self
            .keystore
            .lock()
            .await
            .clone()
            .ok_or(WalletError::NoWallet)?;

        let validation = self.gate.validate(password.expose_secret(), snapshot).await?;
        match &validation {
            Validation::Valid(derived_key) => {
                *self.cached_key.lock() = Some(derived_key.clone());
            }
            Validation::Invalid => self.clear_cached_key(),
        }
        Ok(validation)
    }

    /// Whether `password` opens the wallet
    pub async fn validate_password(&self, password: &SecretString) -> WalletResult<bool> {
        Ok(matches!(
            self.validate(password).await?,
            Validation::Valid(_)
        ))
    }

    /// Get a validated derived key, prompting when needed
    ///
    /// Uses the cached key unless `force_prompt` is set. On a wrong password
    /// the prompt is shown again; [`WalletError::Cancelled`] when the user
    /// dismisses it.
    pub async fn ask_for_password(
        &self,
        reason: &str,
        force_prompt: bool,
    ) -> WalletResult<DerivedKey> {
        if !self.has_wallet().await {
            return Err(WalletError::NoWallet);
        }

        if !force_prompt {
            if let Some(derived_key) = self.cached_valid_key().await? {
                return Ok(derived_key);
            }
        }

        let _prompting = self.prompting.lock().await;

        // Another caller may have unlocked while this one waited
        if !force_prompt {
            if let Some(derived_key) = self.cached_valid_key().await? {
                return Ok(derived_key);
            }
        }

        let mut context = PromptContext::new(reason);
        loop {
            self.emit(PromptState::AwaitingPassword {
                attempt: context.attempt,
            });

            let Some(password) = self.prompt.request_password(&context).await else {
                info!(reason, "Password prompt cancelled");
                self.emit(PromptState::Cancelled);
                return Err(WalletError::Cancelled);
            };

            self.emit(PromptState::Validating);
            match self.validate(&password).await? {
                Validation::Valid(derived_key) => {
                    self.prompt.hide().await;
                    self.emit(PromptState::Accepted);
                    return Ok(derived_key);
                }
                Validation::Invalid => {
                    warn!(reason, attempt = context.attempt, "Wrong password");
                    self.emit(PromptState::Rejected {
                        attempt: context.attempt,
                    });
                    self.prompt.notify_wrong_password(&context).await;
                    context = context.retry();
                }
            }
        }
    }

    /// Apply a mutation to a copy of the keystore, persist it, then swap it in
    async fn update_keystore<T>(
        &self,
        mutate: impl FnOnce(&mut Keystore) -> KeystoreResult<T>,
    ) -> WalletResult<T> {
        let mut guard = self.keystore.lock().await;
        let mut next = guard.as_ref().ok_or(WalletError::NoWallet)?.clone();
        let output = mutate(&mut next)?;
        self.persist(&next)?;
        *guard = Some(next);
        Ok(output)
    }

    /// Derive `count` new addresses
    pub async fn generate_new_keys(&self, count: u32) -> WalletResult<Vec<String>> {
        let derived_key = self.ask_for_password("generate new keys", false).await?;
        let added = self
            .update_keystore(|keystore| keystore.generate_new_keys(&derived_key, count))
            .await?;
        info!(count = added.len(), "Added addresses");
        Ok(added)
    }

    /// Import an alternate root key from a separately formatted mnemonic
    pub async fn import_root_private_key(
        &self,
        mnemonic: &SecretString,
        words_params: &WordsParams,
    ) -> WalletResult<String> {
        let derived_key = self.ask_for_password("import root key", false).await?;
        self.update_keystore(|keystore| {
            keystore.import_root_private_key(&derived_key, mnemonic.expose_secret(), words_params)
        })
        .await
    }

    /// Remove the alternate root key
    pub async fn delete_root_private_key(&self) -> WalletResult<()> {
        self.update_keystore(|keystore| {
            keystore.delete_root_private_key();
            Ok(())
        })
        .await
    }

    /// Re-encrypt the wallet under `new_password`
    ///
    /// Always prompts for the current password.
    pub async fn change_password(&self, new_password: &SecretString) -> WalletResult<()> {
        let old_key = self.ask_for_password("change password", true).await?;

        let salt = self
            .with_keystore(|keystore| keystore.salt().to_string())
            .await?;
        let kdf = Arc::clone(&self.kdf);
        let password = Zeroizing::new(new_password.expose_secret().to_string());
        let new_key = run_blocking(move || kdf.derive_key(&password, &salt)).await?;

        self.update_keystore(|keystore| keystore.re_encrypt_keys(&old_key, &new_key))
            .await?;
        *self.cached_key.lock() = Some(new_key);

        info!(service = %self.config.service, "Changed wallet password");
        Ok(())
    }

    /// Read-only access to the keystore
    pub async fn with_keystore<T>(&self, read: impl FnOnce(&Keystore) -> T) -> WalletResult<T> {
        let guard = self.keystore.lock().await;
        let keystore = guard.as_ref().ok_or(WalletError::NoWallet)?;
        Ok(read(keystore))
    }

    /// Read-only access with a validated derived key
    pub async fn with_unlocked<T>(
        &self,
        reason: &str,
        force_prompt: bool,
        read: impl FnOnce(&Keystore, &DerivedKey) -> T,
    ) -> WalletResult<T> {
        let derived_key = self.ask_for_password(reason, force_prompt).await?;
        self.with_keystore(|keystore| read(keystore, &derived_key))
            .await
    }

    /// Addresses of the loaded wallet
    pub async fn addresses(&self) -> WalletResult<Vec<String>> {
        self.with_keystore(|keystore| keystore.addresses().to_vec())
            .await
    }
}

impl std::fmt::Debug for WalletController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletController")
            .field("config", &self.config)
            .field("backend", &self.store.backend_type())
            .field("gate", &self.gate)
            .finish()
    }
}

/// Run KDF work on the blocking pool
async fn run_blocking<T, F>(work: F) -> WalletResult<T>
where
    F: FnOnce() -> KeystoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| WalletError::Validation(e.to_string()))?
        .map_err(WalletError::from)
}
