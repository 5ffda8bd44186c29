//! HD key vault
//!
//! A [`Keystore`] holds every secret of one wallet identity encrypted under a
//! password-derived key: the mnemonic, the BIP-32 root at the vault's HD
//! path, one private key per derived address, and an optional alternate root
//! key. The key itself is never stored; each operation validates the caller's
//! [`DerivedKey`] against the encrypted mnemonic before touching anything.

use std::collections::BTreeMap;

use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use super::error::{KeystoreError, KeystoreResult};
use super::format::{
    EncryptedField, EncryptedPrivKey, SchemaVersion, SerializedKeystore, VersionProbe,
    CURRENT_VERSION,
};
use super::kdf::{generate_salt, DerivedKey, KeyDerivation};
use crate::ed25519::SignKeys;
use crate::mnemonic::{
    derive_root_signing_seed, normalize_private_key, seed_to_hex, HdRootKey, Mnemonic,
    MnemonicError, WordsParams, DEFAULT_HD_PATH,
};
use crate::sealed::{symmetric, BoxError, BoxKeyPair, SealedBox};
use crate::secure::{SecretArray, SecretBytes, SecretString};

const FIELD_SEED: &str = "encSeed";
const FIELD_HD_ROOT: &str = "encHdRootPriv";
const FIELD_ROOT: &str = "encRootPriv";
const FIELD_PRIV_KEYS: &str = "encPrivKeys";

/// Password-protected HD key vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystore {
    salt: String,
    hd_path: String,
    hd_index: u32,
    enc_seed: Option<SealedBox>,
    enc_hd_root_priv: Option<SealedBox>,
    enc_root_priv: Option<SealedBox>,
    addresses: Vec<String>,
    enc_priv_keys: BTreeMap<String, SealedBox>,
}

impl Keystore {
    /// Create a vault from a password and mnemonic at `hd_path`
    ///
    /// Shorthand for [`KeystoreBuilder`] without optional settings.
    pub fn create_vault(
        password: &str,
        mnemonic: &str,
        hd_path: &str,
        kdf: &dyn KeyDerivation,
    ) -> KeystoreResult<(Self, DerivedKey)> {
        KeystoreBuilder::new(password, mnemonic)
            .hd_path(hd_path)
            .build(kdf)
    }

    /// Derive this vault's key for `password`
    pub fn derive_key(
        &self,
        password: &str,
        kdf: &dyn KeyDerivation,
    ) -> KeystoreResult<DerivedKey> {
        kdf.derive_key(password, &self.salt)
    }

    /// True when `derived_key` opens the encrypted mnemonic
    ///
    /// This is the only password check. A vault without a mnemonic field
    /// accepts no key.
    pub fn is_derived_key_correct(&self, derived_key: &DerivedKey) -> bool {
        match &self.enc_seed {
            Some(sealed) => symmetric::open(sealed, derived_key.expose_secret())
                .map(|plain| !plain.expose_secret().is_empty())
                .unwrap_or(false),
            None => false,
        }
    }

    fn ensure_derived_key(&self, derived_key: &DerivedKey) -> KeystoreResult<()> {
        if self.is_derived_key_correct(derived_key) {
            Ok(())
        } else {
            Err(KeystoreError::IncorrectDerivedKey)
        }
    }

    /// Open a field under an already validated key
    ///
    /// Authentication failure at this point means the field itself is bad.
    fn open_field(
        sealed: &SealedBox,
        derived_key: &DerivedKey,
        field: &str,
    ) -> KeystoreResult<SecretBytes> {
        symmetric::open(sealed, derived_key.expose_secret()).map_err(|e| match e {
            BoxError::AuthenticationFailed => KeystoreError::CorruptedField(field.to_string()),
            other => other.into(),
        })
    }

    fn open_utf8(
        sealed: &SealedBox,
        derived_key: &DerivedKey,
        field: &str,
    ) -> KeystoreResult<SecretString> {
        let plain = Self::open_field(sealed, derived_key, field)?;
        let text = std::str::from_utf8(plain.expose_secret())
            .map_err(|_| KeystoreError::CorruptedField(field.to_string()))?;
        Ok(text.to_string().into())
    }

    /// Decrypt the mnemonic phrase
    pub fn get_seed(&self, derived_key: &DerivedKey) -> KeystoreResult<SecretString> {
        self.ensure_derived_key(derived_key)?;
        let sealed = self
            .enc_seed
            .as_ref()
            .ok_or(KeystoreError::MissingRootKey(FIELD_SEED))?;
        Self::open_utf8(sealed, derived_key, FIELD_SEED)
    }

    fn hd_root_key(&self, derived_key: &DerivedKey) -> KeystoreResult<HdRootKey> {
        let sealed = self
            .enc_hd_root_priv
            .as_ref()
            .ok_or(KeystoreError::MissingRootKey(FIELD_HD_ROOT))?;
        let xprv = Self::open_utf8(sealed, derived_key, FIELD_HD_ROOT)?;
        Ok(HdRootKey::from_xprv(xprv.expose_secret())?)
    }

    /// Derive `count` new addresses starting at the current HD index
    ///
    /// All keys are derived and sealed before any field changes, so a
    /// derivation failure leaves the vault untouched. Returns the new
    /// addresses in index order.
    pub fn generate_new_keys(
        &mut self,
        derived_key: &DerivedKey,
        count: u32,
    ) -> KeystoreResult<Vec<String>> {
        self.ensure_derived_key(derived_key)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let root = self.hd_root_key(derived_key)?;
        let start = self.hd_index;
        let end = start.checked_add(count).ok_or_else(|| {
            MnemonicError::DerivationFailed(format!("hd index overflow at {}", start))
        })?;

        let mut staged = Vec::with_capacity(count as usize);
        for index in start..end {
            let seed = root.derive_child_seed(index)?;
            let address = SignKeys::from_seed(seed.expose_secret()).address();
            let sealed = symmetric::seal(seed.expose_secret(), derived_key.expose_secret())?;
            staged.push((address, sealed));
        }

        let mut added = Vec::with_capacity(staged.len());
        for (address, sealed) in staged {
            self.enc_priv_keys.insert(address.clone(), sealed);
            self.addresses.push(address.clone());
            self.hd_index += 1;
            added.push(address);
        }

        debug!(count, hd_index = self.hd_index, "Generated HD keys");
        Ok(added)
    }

    fn sign_keys_for(&self, address: &str, derived_key: &DerivedKey) -> KeystoreResult<SignKeys> {
        let sealed = self
            .enc_priv_keys
            .get(address)
            .ok_or_else(|| KeystoreError::AddressNotFound(address.to_string()))?;
        let plain = Self::open_field(sealed, derived_key, FIELD_PRIV_KEYS)?;
        let seed = normalize_private_key(plain.expose_secret())?;
        Ok(SignKeys::from_seed(seed.expose_secret()))
    }

    /// Hex private key for a derived address
    pub fn export_hd_private_key(
        &self,
        address: &str,
        derived_key: &DerivedKey,
    ) -> KeystoreResult<SecretString> {
        self.ensure_derived_key(derived_key)?;
        let sealed = self
            .enc_priv_keys
            .get(address)
            .ok_or_else(|| KeystoreError::AddressNotFound(address.to_string()))?;
        let plain = Self::open_field(sealed, derived_key, FIELD_PRIV_KEYS)?;
        let seed = normalize_private_key(plain.expose_secret())?;
        Ok(seed_to_hex(&seed))
    }

    /// Signing keypair for the address at `hd_index`
    pub fn export_hd_sign_keys(
        &self,
        derived_key: &DerivedKey,
        hd_index: u32,
    ) -> KeystoreResult<SignKeys> {
        self.ensure_derived_key(derived_key)?;
        let address = self.address_at(hd_index)?;
        self.sign_keys_for(address, derived_key)
    }

    /// Box keypair for the address at `hd_index`
    pub fn box_keypair(
        &self,
        derived_key: &DerivedKey,
        hd_index: u32,
    ) -> KeystoreResult<BoxKeyPair> {
        Ok(self.export_hd_sign_keys(derived_key, hd_index)?.box_keypair())
    }

    fn address_at(&self, hd_index: u32) -> KeystoreResult<&str> {
        self.addresses
            .get(hd_index as usize)
            .map(String::as_str)
            .ok_or_else(|| KeystoreError::AddressNotFound(format!("hd index {}", hd_index)))
    }

    /// Store an alternate root key derived from a separately formatted mnemonic
    ///
    /// Replaces any existing alternate root key. Returns its address.
    pub fn import_root_private_key(
        &mut self,
        derived_key: &DerivedKey,
        mnemonic: &str,
        words_params: &WordsParams,
    ) -> KeystoreResult<String> {
        self.ensure_derived_key(derived_key)?;

        let mnemonic = Mnemonic::from_phrase_with(mnemonic, words_params)
            .map_err(|e| KeystoreError::InvalidMnemonic(e.to_string()))?;
        let seed = derive_root_signing_seed(&mnemonic)?;
        let address = SignKeys::from_seed(seed.expose_secret()).address();
        let sealed = symmetric::seal(seed.expose_secret(), derived_key.expose_secret())?;

        self.enc_root_priv = Some(sealed);
        info!(
            word_count = words_params.word_count,
            "Imported alternate root key"
        );
        Ok(address)
    }

    fn root_seed(&self, derived_key: &DerivedKey) -> KeystoreResult<SecretArray<32>> {
        self.ensure_derived_key(derived_key)?;
        let sealed = self
            .enc_root_priv
            .as_ref()
            .ok_or(KeystoreError::MissingRootKey(FIELD_ROOT))?;
        let plain = Self::open_field(sealed, derived_key, FIELD_ROOT)?;
        Ok(normalize_private_key(plain.expose_secret())?)
    }

    /// Hex alternate root private key
    pub fn export_root_private_key(&self, derived_key: &DerivedKey) -> KeystoreResult<SecretString> {
        Ok(seed_to_hex(&self.root_seed(derived_key)?))
    }

    /// Signing keypair for the alternate root key
    pub fn export_root_sign_keys(&self, derived_key: &DerivedKey) -> KeystoreResult<SignKeys> {
        Ok(SignKeys::from_seed(self.root_seed(derived_key)?.expose_secret()))
    }

    /// Forget the alternate root key
    pub fn delete_root_private_key(&mut self) {
        if self.enc_root_priv.take().is_some() {
            info!("Deleted alternate root key");
        }
    }

    /// Re-encrypt every secret field under `new_key`
    ///
    /// Everything is opened under `old_key` and sealed under `new_key` before
    /// any field is replaced; on error the vault is unchanged.
    pub fn re_encrypt_keys(
        &mut self,
        old_key: &DerivedKey,
        new_key: &DerivedKey,
    ) -> KeystoreResult<()> {
        self.ensure_derived_key(old_key)?;

        let reseal = |sealed: &SealedBox, field: &str| -> KeystoreResult<SealedBox> {
            let plain = Self::open_field(sealed, old_key, field)?;
            Ok(symmetric::seal(plain.expose_secret(), new_key.expose_secret())?)
        };
        let reseal_opt =
            |sealed: &Option<SealedBox>, field: &str| -> KeystoreResult<Option<SealedBox>> {
                sealed.as_ref().map(|s| reseal(s, field)).transpose()
            };

        let enc_seed = reseal_opt(&self.enc_seed, FIELD_SEED)?;
        let enc_hd_root_priv = reseal_opt(&self.enc_hd_root_priv, FIELD_HD_ROOT)?;
        let enc_root_priv = reseal_opt(&self.enc_root_priv, FIELD_ROOT)?;
        let enc_priv_keys = self
            .enc_priv_keys
            .iter()
            .map(|(address, sealed)| Ok((address.clone(), reseal(sealed, FIELD_PRIV_KEYS)?)))
            .collect::<KeystoreResult<BTreeMap<_, _>>>()?;

        self.enc_seed = enc_seed;
        self.enc_hd_root_priv = enc_hd_root_priv;
        self.enc_root_priv = enc_root_priv;
        self.enc_priv_keys = enc_priv_keys;

        info!(
            addresses = self.addresses.len(),
            "Re-encrypted keystore under new key"
        );
        Ok(())
    }

    /// Serialize to the current schema
    pub fn serialize(&self) -> KeystoreResult<String> {
        let doc = SerializedKeystore {
            version: CURRENT_VERSION,
            salt: self.salt.clone(),
            hd_path_string: self.hd_path.clone(),
            hd_index: self.hd_index,
            enc_seed: self.enc_seed.as_ref().map(to_field),
            enc_root_priv: self.enc_root_priv.as_ref().map(to_field),
            enc_hd_root_priv: self.enc_hd_root_priv.as_ref().map(to_field),
            addresses: self.addresses.clone(),
            enc_priv_keys: self
                .enc_priv_keys
                .iter()
                .map(|(address, sealed)| {
                    (
                        address.clone(),
                        EncryptedPrivKey {
                            key: sealed.ciphertext_base64(),
                            nonce: sealed.nonce_base64(),
                        },
                    )
                })
                .collect(),
        };
        Ok(serde_json::to_string(&doc)?)
    }

    /// Restore a serialized keystore
    ///
    /// Returns `Ok(None)` for versions that are no longer readable,
    /// [`KeystoreError::NeedsUpgrade`] for versions that must be migrated
    /// first, and [`KeystoreError::UnsupportedVersion`] for newer ones.
    pub fn deserialize(json: &str) -> KeystoreResult<Option<Self>> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        match SchemaVersion::classify(probe.version) {
            SchemaVersion::Dropped(version) => {
                warn!(version, "Keystore version no longer supported, ignoring");
                return Ok(None);
            }
            SchemaVersion::NeedsUpgrade(found) => {
                warn!(found, current = CURRENT_VERSION, "Keystore needs upgrade");
                return Err(KeystoreError::NeedsUpgrade {
                    found,
                    current: CURRENT_VERSION,
                });
            }
            SchemaVersion::Unsupported(version) => {
                return Err(KeystoreError::UnsupportedVersion(version));
            }
            SchemaVersion::Current => {}
        }

        let doc: SerializedKeystore = serde_json::from_str(json)?;
        Self::from_document(doc).map(Some)
    }

    fn from_document(doc: SerializedKeystore) -> KeystoreResult<Self> {
        let enc_priv_keys = doc
            .enc_priv_keys
            .into_iter()
            .map(|(address, field)| {
                let sealed = SealedBox::from_base64(&field.key, &field.nonce).map_err(|_| {
                    KeystoreError::CorruptedField(format!("{}.{}", FIELD_PRIV_KEYS, address))
                })?;
                Ok((address, sealed))
            })
            .collect::<KeystoreResult<BTreeMap<_, _>>>()?;

        if doc.addresses.len() != doc.hd_index as usize
            || enc_priv_keys.len() != doc.addresses.len()
            || !doc.addresses.iter().all(|a| enc_priv_keys.contains_key(a))
        {
            return Err(KeystoreError::CorruptedField("addresses".to_string()));
        }

        Ok(Self {
            salt: doc.salt,
            hd_path: doc.hd_path_string,
            hd_index: doc.hd_index,
            enc_seed: from_field(doc.enc_seed, FIELD_SEED)?,
            enc_hd_root_priv: from_field(doc.enc_hd_root_priv, FIELD_HD_ROOT)?,
            enc_root_priv: from_field(doc.enc_root_priv, FIELD_ROOT)?,
            addresses: doc.addresses,
            enc_priv_keys,
        })
    }

    /// KDF salt
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// HD derivation path of the root key
    pub fn hd_path(&self) -> &str {
        &self.hd_path
    }

    /// Next HD index to derive
    pub fn hd_index(&self) -> u32 {
        self.hd_index
    }

    /// Derived addresses in index order
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Schema version this keystore serializes to
    pub fn version(&self) -> u32 {
        CURRENT_VERSION
    }

    /// Whether an alternate root key is stored
    pub fn has_root_private_key(&self) -> bool {
        self.enc_root_priv.is_some()
    }
}

fn to_field(sealed: &SealedBox) -> EncryptedField {
    EncryptedField {
        enc_str: sealed.ciphertext_base64(),
        nonce: sealed.nonce_base64(),
    }
}

fn from_field(field: Option<EncryptedField>, name: &str) -> KeystoreResult<Option<SealedBox>> {
    field
        .map(|f| {
            SealedBox::from_base64(&f.enc_str, &f.nonce)
                .map_err(|_| KeystoreError::CorruptedField(name.to_string()))
        })
        .transpose()
}

/// Builder for new vaults
pub struct KeystoreBuilder {
    password: SecretString,
    mnemonic: SecretString,
    hd_path: String,
    words_params: Option<WordsParams>,
    salt: Option<String>,
}

impl KeystoreBuilder {
    /// Start a vault for `password` and `mnemonic`
    pub fn new(password: &str, mnemonic: &str) -> Self {
        Self {
            password: password.to_string().into(),
            mnemonic: mnemonic.to_string().into(),
            hd_path: DEFAULT_HD_PATH.to_string(),
            words_params: None,
            salt: None,
        }
    }

    /// Set the HD derivation path
    pub fn hd_path(mut self, hd_path: &str) -> Self {
        self.hd_path = hd_path.to_string();
        self
    }

    /// Require the mnemonic to match a word count and dictionary
    pub fn words_params(mut self, words_params: WordsParams) -> Self {
        self.words_params = Some(words_params);
        self
    }

    /// Use a fixed salt (normally random)
    pub fn salt(mut self, salt: &str) -> Self {
        self.salt = Some(salt.to_string());
        self
    }

    /// Build the vault
    ///
    /// # Returns
    ///
    /// The keystore with one derived address (index 0) and the derived key
    /// it is encrypted under
    pub fn build(self, kdf: &dyn KeyDerivation) -> KeystoreResult<(Keystore, DerivedKey)> {
        let phrase = self.mnemonic.expose_secret();
        let mnemonic = match &self.words_params {
            Some(params) => Mnemonic::from_phrase_with(phrase, params),
            None => Mnemonic::from_phrase(phrase),
        }
        .map_err(|e| KeystoreError::InvalidMnemonic(e.to_string()))?;

        let hd_root = HdRootKey::from_mnemonic(&mnemonic, &self.hd_path)?;

        let salt = self.salt.unwrap_or_else(generate_salt);
        let derived_key = kdf.derive_key(self.password.expose_secret(), &salt)?;
        let key = derived_key.expose_secret();

        let enc_seed = symmetric::seal(mnemonic.phrase().as_bytes(), key)?;
        let enc_hd_root_priv = symmetric::seal(hd_root.to_xprv().expose_secret().as_bytes(), key)?;

        let mut keystore = Keystore {
            salt,
            hd_path: self.hd_path,
            hd_index: 0,
            enc_seed: Some(enc_seed),
            enc_hd_root_priv: Some(enc_hd_root_priv),
            enc_root_priv: None,
            addresses: Vec::new(),
            enc_priv_keys: BTreeMap::new(),
        };
        keystore.generate_new_keys(&derived_key, 1)?;

        info!(hd_path = %keystore.hd_path, "Created keystore");
        Ok((keystore, derived_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::kdf::{ScryptKdf, ScryptParams};

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn fast_kdf() -> ScryptKdf {
        ScryptKdf::new(ScryptParams {
            log_n: 8,
            ..ScryptParams::default()
        })
    }

    fn vault(password: &str) -> (Keystore, DerivedKey) {
        Keystore::create_vault(password, TEST_MNEMONIC, DEFAULT_HD_PATH, &fast_kdf()).unwrap()
    }

    #[test]
    fn test_create_vault_derives_first_address() {
        let (ks, dk) = vault("pw");
        assert_eq!(ks.hd_index(), 1);
        assert_eq!(ks.addresses().len(), 1);
        assert!(ks.is_derived_key_correct(&dk));
        assert_eq!(ks.get_seed(&dk).unwrap().expose_secret(), TEST_MNEMONIC);
    }

    #[test]
    fn test_invalid_mnemonic_rejected() {
        let result = Keystore::create_vault(
            "pw",
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon",
            DEFAULT_HD_PATH,
            &fast_kdf(),
        );
        assert!(matches!(result, Err(KeystoreError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_words_params_enforced() {
        let result = KeystoreBuilder::new("pw", TEST_MNEMONIC)
            .words_params(WordsParams::english(24))
            .build(&fast_kdf());
        assert!(matches!(result, Err(KeystoreError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_fixed_salt_is_deterministic() {
        let kdf = fast_kdf();
        let (a, dk_a) = KeystoreBuilder::new("pw", TEST_MNEMONIC)
            .salt("fixed")
            .build(&kdf)
            .unwrap();
        let (b, dk_b) = KeystoreBuilder::new("pw", TEST_MNEMONIC)
            .salt("fixed")
            .build(&kdf)
            .unwrap();
        assert_eq!(a.salt(), "fixed");
        assert_eq!(dk_a.expose_secret(), dk_b.expose_secret());
        assert_eq!(a.addresses(), b.addresses());
    }

    #[test]
    fn test_wrong_key_rejected_before_mutation() {
        let (mut ks, _) = vault("pw");
        let wrong = ks.derive_key("other", &fast_kdf()).unwrap();
        assert!(!ks.is_derived_key_correct(&wrong));

        let before = ks.clone();
        assert!(matches!(
            ks.generate_new_keys(&wrong, 2),
            Err(KeystoreError::IncorrectDerivedKey)
        ));
        assert!(matches!(
            ks.import_root_private_key(&wrong, TEST_MNEMONIC, &WordsParams::default()),
            Err(KeystoreError::IncorrectDerivedKey)
        ));
        assert_eq!(ks, before);
    }

    #[test]
    fn test_generate_new_keys_appends_in_order() {
        let (mut ks, dk) = vault("pw");
        let added = ks.generate_new_keys(&dk, 3).unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(ks.hd_index(), 4);
        assert_eq!(&ks.addresses()[1..], added.as_slice());

        // Same mnemonic and path reproduce the same addresses
        let (mut other, other_dk) = vault("different password");
        other.generate_new_keys(&other_dk, 3).unwrap();
        assert_eq!(ks.addresses(), other.addresses());
    }

    #[test]
    fn test_generate_zero_keys_is_noop() {
        let (mut ks, dk) = vault("pw");
        assert!(ks.generate_new_keys(&dk, 0).unwrap().is_empty());
        assert_eq!(ks.hd_index(), 1);
    }

    #[test]
    fn test_export_hd_keys() {
        let (mut ks, dk) = vault("pw");
        ks.generate_new_keys(&dk, 1).unwrap();

        let address = ks.addresses()[1].clone();
        let keys = ks.export_hd_sign_keys(&dk, 1).unwrap();
        assert_eq!(keys.address(), address);

        let private_key = ks.export_hd_private_key(&address, &dk).unwrap();
        let seed: [u8; 32] = hex::decode(private_key.expose_secret())
            .unwrap()
            .try_into()
            .unwrap();
        assert_eq!(SignKeys::from_seed(&seed).address(), address);

        // First address matches the BIP-32 child of the test vector
        let first = ks.export_hd_private_key(&ks.addresses()[0], &dk).unwrap();
        assert_eq!(
            first.expose_secret(),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
    }

    #[test]
    fn test_unknown_address() {
        let (ks, dk) = vault("pw");
        assert!(matches!(
            ks.export_hd_private_key("00", &dk),
            Err(KeystoreError::AddressNotFound(_))
        ));
        assert!(matches!(
            ks.export_hd_sign_keys(&dk, 5),
            Err(KeystoreError::AddressNotFound(_))
        ));
    }

    #[test]
    fn test_root_private_key_lifecycle() {
        let (mut ks, dk) = vault("pw");
        assert!(matches!(
            ks.export_root_private_key(&dk),
            Err(KeystoreError::MissingRootKey(_))
        ));

        let alt = "legal winner thank year wave sausage worth useful legal winner thank yellow";
        let address = ks
            .import_root_private_key(&dk, alt, &WordsParams::english(12))
            .unwrap();
        assert!(ks.has_root_private_key());
        assert_eq!(ks.export_root_sign_keys(&dk).unwrap().address(), address);
        assert_eq!(ks.export_root_private_key(&dk).unwrap().expose_secret().len(), 64);

        ks.delete_root_private_key();
        assert!(!ks.has_root_private_key());
    }

    #[test]
    fn test_import_root_rejects_bad_mnemonic() {
        let (mut ks, dk) = vault("pw");
        let result = ks.import_root_private_key(&dk, "not a mnemonic", &WordsParams::english(12));
        assert!(matches!(result, Err(KeystoreError::InvalidMnemonic(_))));
    }

    #[test]
    fn test_re_encrypt_keys() {
        let kdf = fast_kdf();
        let (mut ks, old) = vault("old");
        ks.generate_new_keys(&old, 2).unwrap();
        let exported_before = ks.export_hd_private_key(&ks.addresses()[2], &old).unwrap();

        let new = ks.derive_key("new", &kdf).unwrap();
        ks.re_encrypt_keys(&old, &new).unwrap();

        assert!(!ks.is_derived_key_correct(&old));
        assert!(ks.is_derived_key_correct(&new));
        assert_eq!(ks.get_seed(&new).unwrap().expose_secret(), TEST_MNEMONIC);
        let exported_after = ks.export_hd_private_key(&ks.addresses()[2], &new).unwrap();
        assert_eq!(exported_before.expose_secret(), exported_after.expose_secret());

        // Derivation from the re-encrypted root still works
        ks.generate_new_keys(&new, 1).unwrap();
        assert_eq!(ks.hd_index(), 4);
    }

    #[test]
    fn test_re_encrypt_with_wrong_old_key() {
        let kdf = fast_kdf();
        let (mut ks, _) = vault("pw");
        let wrong = ks.derive_key("nope", &kdf).unwrap();
        let new = ks.derive_key("new", &kdf).unwrap();
        let before = ks.clone();
        assert!(matches!(
            ks.re_encrypt_keys(&wrong, &new),
            Err(KeystoreError::IncorrectDerivedKey)
        ));
        assert_eq!(ks, before);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let (mut ks, dk) = vault("pw");
        ks.generate_new_keys(&dk, 2).unwrap();

        let json = ks.serialize().unwrap();
        let restored = Keystore::deserialize(&json).unwrap().unwrap();
        assert_eq!(restored, ks);
        assert!(restored.is_derived_key_correct(&dk));
    }

    #[test]
    fn test_deserialize_version_gate() {
        let (ks, _) = vault("pw");
        let mut value: serde_json::Value = serde_json::from_str(&ks.serialize().unwrap()).unwrap();

        value["version"] = 1.into();
        assert!(Keystore::deserialize(&value.to_string()).unwrap().is_none());

        value["version"] = 2.into();
        assert!(matches!(
            Keystore::deserialize(&value.to_string()),
            Err(KeystoreError::NeedsUpgrade { found: 2, current: 3 })
        ));

        value["version"] = 9.into();
        assert!(matches!(
            Keystore::deserialize(&value.to_string()),
            Err(KeystoreError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_index() {
        let (ks, _) = vault("pw");
        let mut value: serde_json::Value = serde_json::from_str(&ks.serialize().unwrap()).unwrap();
        value["hdIndex"] = 5.into();
        assert!(matches!(
            Keystore::deserialize(&value.to_string()),
            Err(KeystoreError::CorruptedField(_))
        ));
    }

    #[test]
    fn test_keystore_without_seed_accepts_no_key() {
        let (ks, dk) = vault("pw");
        let mut value: serde_json::Value = serde_json::from_str(&ks.serialize().unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("encSeed");
        let restored = Keystore::deserialize(&value.to_string()).unwrap().unwrap();
        assert!(!restored.is_derived_key_correct(&dk));
    }
}
