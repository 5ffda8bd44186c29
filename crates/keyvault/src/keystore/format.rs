//! Serialized keystore layout and schema version gate

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Schema version written by this build
pub const CURRENT_VERSION: u32 = 3;

/// Highest schema version that is no longer readable at all
pub const DROPPED_VERSION: u32 = 1;

/// How a serialized schema version is handled on load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Too old to read; loading yields no keystore
    Dropped(u32),
    /// Readable only after migration by an external tool
    NeedsUpgrade(u32),
    /// The current layout
    Current,
    /// Written by a newer build
    Unsupported(u32),
}

impl SchemaVersion {
    /// Classify a version number
    pub fn classify(version: u32) -> Self {
        match version {
            v if v <= DROPPED_VERSION => SchemaVersion::Dropped(v),
            CURRENT_VERSION => SchemaVersion::Current,
            v if v < CURRENT_VERSION => SchemaVersion::NeedsUpgrade(v),
            v => SchemaVersion::Unsupported(v),
        }
    }
}

/// Only the version field, read before committing to a layout
#[derive(Debug, Deserialize)]
pub(crate) struct VersionProbe {
    #[serde(default)]
    pub version: u32,
}

/// Symmetric box as `{ encStr, nonce }`, both base64
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EncryptedField {
    pub enc_str: String,
    pub nonce: String,
}

/// Per-address private key box as `{ key, nonce }`, both base64
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EncryptedPrivKey {
    pub key: String,
    pub nonce: String,
}

/// Version 3 keystore document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SerializedKeystore {
    pub version: u32,
    pub salt: String,
    pub hd_path_string: String,
    #[serde(default)]
    pub hd_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enc_seed: Option<EncryptedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enc_root_priv: Option<EncryptedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enc_hd_root_priv: Option<EncryptedField>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub enc_priv_keys: BTreeMap<String, EncryptedPrivKey>,
}
