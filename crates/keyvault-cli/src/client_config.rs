//! Client configuration for the keyvault CLI
//!
//! Stored in `{home}/config/vault.toml`:
//!
//! ```toml
//! store-backend = "file"
//! store-dir = ""
//!
//! [wallet]
//! service = "keyvault.wallet"
//! hd-path = "m/44'/60'/0'/0"
//! ```

use anyhow::{Context, Result};
use keyvault::{StoreBackend, WalletConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Client configuration file name
pub const CLIENT_CONFIG_FILENAME: &str = "vault.toml";

/// Default store directory name within home
pub const DEFAULT_STORE_DIR: &str = "store";

/// CLI configuration loaded from `vault.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Store backend (file|memory)
    #[serde(default = "default_store_backend")]
    pub store_backend: String,

    /// Store directory. Empty means `{home}/store`.
    #[serde(default)]
    pub store_dir: String,

    /// Wallet controller settings
    #[serde(default)]
    pub wallet: WalletConfig,
}

fn default_store_backend() -> String {
    StoreBackend::File.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_backend: default_store_backend(),
            store_dir: String::new(),
            wallet: WalletConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Get the path to the client config file.
    pub fn config_path(home: &Path) -> PathBuf {
        home.join("config").join(CLIENT_CONFIG_FILENAME)
    }

    /// Load client configuration from file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = Self::config_path(home);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read client config: {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse client config: {}", config_path.display()))?;
        config
            .wallet
            .validate()
            .with_context(|| format!("Invalid wallet settings in {}", config_path.display()))?;
        Ok(config)
    }

    /// Save client configuration to file.
    pub fn save(&self, home: &Path) -> Result<()> {
        let config_path = Self::config_path(home);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize client config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write client config: {}", config_path.display()))?;

        Ok(())
    }

    /// Resolve the effective store directory.
    ///
    /// `store_dir` from config if non-empty, otherwise `{home}/store`.
    pub fn effective_store_dir(&self, home: &Path) -> PathBuf {
        if self.store_dir.is_empty() {
            home.join(DEFAULT_STORE_DIR)
        } else {
            PathBuf::from(&self.store_dir)
        }
    }

    /// Parse the configured store backend
    pub fn effective_store_backend(&self) -> Result<StoreBackend> {
        if self.store_backend.is_empty() {
            return Ok(StoreBackend::default());
        }
        self.store_backend.parse().with_context(|| {
            format!(
                "Unknown store backend '{}', expected one of: {}",
                self.store_backend,
                StoreBackend::variants().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.store_backend, "file");
        assert!(config.store_dir.is_empty());
        assert_eq!(config.wallet, WalletConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let home = temp_dir.path();

        let config = ClientConfig {
            store_backend: "memory".to_string(),
            store_dir: "/custom/store".to_string(),
            wallet: WalletConfig::default()
                .with_service("work.wallet")
                .with_hd_path("m/44'/1'/0'/0"),
        };

        config.save(home).unwrap();

        let loaded = ClientConfig::load(home).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.effective_store_backend().unwrap(), StoreBackend::Memory);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let temp_dir = tempdir().unwrap();
        let config = ClientConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let temp_dir = tempdir().unwrap();
        let home = temp_dir.path();
        let path = ClientConfig::config_path(home);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[wallet]\nservice = \"other.wallet\"\n").unwrap();

        let config = ClientConfig::load(home).unwrap();
        assert_eq!(config.store_backend, "file");
        assert_eq!(config.wallet.service, "other.wallet");
        assert_eq!(config.wallet.hd_path, WalletConfig::default().hd_path);
    }

    #[test]
    fn test_load_rejects_invalid_wallet_settings() {
        let temp_dir = tempdir().unwrap();
        let home = temp_dir.path();
        let path = ClientConfig::config_path(home);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[wallet]\nhd-path = \"not a path\"\n").unwrap();

        assert!(ClientConfig::load(home).is_err());
    }

    #[test]
    fn test_effective_store_dir() {
        let home = PathBuf::from("/home/user/.keyvault");
        let mut config = ClientConfig::default();
        assert_eq!(
            config.effective_store_dir(&home),
            PathBuf::from("/home/user/.keyvault/store")
        );

        config.store_dir = "/elsewhere".to_string();
        assert_eq!(config.effective_store_dir(&home), PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let config = ClientConfig {
            store_backend: "keychain".to_string(),
            ..Default::default()
        };
        assert!(config.effective_store_backend().is_err());
    }
}
