//! Wallet configuration

use serde::{Deserialize, Serialize};

use crate::controller::{WalletError, WalletResult};
use crate::keystore::ScryptParams;
use crate::mnemonic::{parse_hd_path, DEFAULT_HD_PATH};
use crate::storage::validate_key;

/// Default storage key for the serialized keystore
pub const DEFAULT_SERVICE: &str = "keyvault.wallet";

/// Settings for one wallet controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WalletConfig {
    /// Storage key the keystore is persisted under
    #[serde(default = "default_service")]
    pub service: String,

    /// HD derivation path for new wallets
    #[serde(default = "default_hd_path")]
    pub hd_path: String,

    /// Password KDF work factor
    #[serde(default)]
    pub scrypt: ScryptParams,
}

fn default_service() -> String {
    DEFAULT_SERVICE.to_string()
}

fn default_hd_path() -> String {
    DEFAULT_HD_PATH.to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            hd_path: default_hd_path(),
            scrypt: ScryptParams::default(),
        }
    }
}

impl WalletConfig {
    /// Use a different storage key
    pub fn with_service(mut self, service: &str) -> Self {
        self.service = service.to_string();
        self
    }

    /// Use a different HD path for new wallets
    pub fn with_hd_path(mut self, hd_path: &str) -> Self {
        self.hd_path = hd_path.to_string();
        self
    }

    /// Use a different KDF work factor
    pub fn with_scrypt(mut self, scrypt: ScryptParams) -> Self {
        self.scrypt = scrypt;
        self
    }

    /// Check every field
    pub fn validate(&self) -> WalletResult<()> {
        validate_key(&self.service)
            .map_err(|e| WalletError::InvalidConfig(format!("service: {}", e)))?;
        parse_hd_path(&self.hd_path)
            .map_err(|e| WalletError::InvalidConfig(format!("hd-path: {}", e)))?;
        self.scrypt
            .validate()
            .map_err(|e| WalletError::InvalidConfig(format!("scrypt: {}", e)))?;
        Ok(())
    }
}
