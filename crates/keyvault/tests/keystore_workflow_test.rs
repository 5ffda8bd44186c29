//! Integration tests for the keystore lifecycle
//!
//! These tests drive a vault through creation, key generation, export,
//! serialization, the version gate and password rotation.

use keyvault::keystore::{CURRENT_VERSION, DROPPED_VERSION};
use keyvault::{
    ExposeSecret, KeyDerivation, Keystore, KeystoreBuilder, KeystoreError, Mnemonic, ScryptKdf,
    ScryptParams, SignKeys, WordsParams, DEFAULT_HD_PATH,
};

const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn fast_kdf() -> ScryptKdf {
    ScryptKdf::new(ScryptParams {
        log_n: 8,
        ..ScryptParams::default()
    })
}

/// Create -> extend -> serialize -> restore -> sign
#[test]
fn test_full_vault_workflow() {
    let kdf = fast_kdf();

    // Step 1: Create the vault
    let (mut keystore, derived_key) =
        Keystore::create_vault("correct horse", TEST_MNEMONIC, DEFAULT_HD_PATH, &kdf).unwrap();
    assert_eq!(keystore.hd_index(), 1);

    // Step 2: Extend with more addresses
    let added = keystore.generate_new_keys(&derived_key, 4).unwrap();
    assert_eq!(added.len(), 4);
    assert_eq!(keystore.addresses().len(), 5);

    // Step 3: Persist and restore
    let json = keystore.serialize().unwrap();
    let restored = Keystore::deserialize(&json)
        .unwrap()
        .expect("current version must load");

    // Step 4: Re-derive the key from the password alone
    let rederived = restored.derive_key("correct horse", &kdf).unwrap();
    assert!(restored.is_derived_key_correct(&rederived));

    // Step 5: Sign with a restored key and verify against the address
    let keys = restored.export_hd_sign_keys(&rederived, 3).unwrap();
    assert_eq!(keys.address(), restored.addresses()[3]);
    let sig = keys.sign(b"transfer 10");
    assert!(keys.public_key.verify(b"transfer 10", &sig));
    assert!(!keys.public_key.verify(b"transfer 11", &sig));
}

#[test]
fn test_seed_roundtrip_normalizes_whitespace() {
    let messy = format!("  {}  ", TEST_MNEMONIC.replace(' ', "   "));
    let (keystore, derived_key) =
        Keystore::create_vault("pw", &messy, DEFAULT_HD_PATH, &fast_kdf()).unwrap();
    assert_eq!(
        keystore.get_seed(&derived_key).unwrap().expose_secret(),
        TEST_MNEMONIC
    );
}

#[test]
fn test_password_correctness_symmetry() {
    let kdf = fast_kdf();
    let (keystore, _) =
        Keystore::create_vault("right", TEST_MNEMONIC, DEFAULT_HD_PATH, &kdf).unwrap();

    let right = kdf.derive_key("right", keystore.salt()).unwrap();
    assert!(keystore.is_derived_key_correct(&right));

    for wrong in ["", "Right", "right ", "wrong"] {
        let key = kdf.derive_key(wrong, keystore.salt()).unwrap();
        assert!(!keystore.is_derived_key_correct(&key), "{:?} accepted", wrong);
        assert!(matches!(
            keystore.get_seed(&key),
            Err(KeystoreError::IncorrectDerivedKey)
        ));
    }
}

#[test]
fn test_hd_index_monotonic_and_reproducible() {
    let kdf = fast_kdf();
    let (mut first, first_key) =
        Keystore::create_vault("a", TEST_MNEMONIC, DEFAULT_HD_PATH, &kdf).unwrap();
    let (mut second, second_key) =
        Keystore::create_vault("b", TEST_MNEMONIC, DEFAULT_HD_PATH, &kdf).unwrap();

    for n in [1u32, 2, 3] {
        let before = first.hd_index();
        first.generate_new_keys(&first_key, n).unwrap();
        assert_eq!(first.hd_index(), before + n);
        assert_eq!(first.addresses().len() as u32, first.hd_index());
    }

    // One batch of six reproduces the three batches above
    second.generate_new_keys(&second_key, 6).unwrap();
    assert_eq!(first.addresses(), second.addresses());

    // A different path yields different addresses
    let (other_path, _) =
        Keystore::create_vault("a", TEST_MNEMONIC, "m/44'/60'/1'/0", &kdf).unwrap();
    assert_ne!(other_path.addresses()[0], first.addresses()[0]);
}

#[test]
fn test_serialization_preserves_secrets() {
    let kdf = fast_kdf();
    let (mut keystore, derived_key) =
        Keystore::create_vault("pw", TEST_MNEMONIC, DEFAULT_HD_PATH, &kdf).unwrap();
    keystore.generate_new_keys(&derived_key, 2).unwrap();
    keystore
        .import_root_private_key(
            &derived_key,
            "legal winner thank year wave sausage worth useful legal winner thank yellow",
            &WordsParams::english(12),
        )
        .unwrap();

    let restored = Keystore::deserialize(&keystore.serialize().unwrap())
        .unwrap()
        .unwrap();

    assert_eq!(restored.addresses(), keystore.addresses());
    assert_eq!(restored.hd_index(), keystore.hd_index());
    assert_eq!(restored.version(), CURRENT_VERSION);
    assert_eq!(
        restored.get_seed(&derived_key).unwrap().expose_secret(),
        TEST_MNEMONIC
    );
    for address in keystore.addresses() {
        assert_eq!(
            restored
                .export_hd_private_key(address, &derived_key)
                .unwrap()
                .expose_secret(),
            keystore
                .export_hd_private_key(address, &derived_key)
                .unwrap()
                .expose_secret()
        );
    }
    assert_eq!(
        restored
            .export_root_private_key(&derived_key)
            .unwrap()
            .expose_secret(),
        keystore
            .export_root_private_key(&derived_key)
            .unwrap()
            .expose_secret()
    );
}

#[test]
fn test_serialized_layout() {
    let (keystore, _) =
        Keystore::create_vault("pw", TEST_MNEMONIC, DEFAULT_HD_PATH, &fast_kdf()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&keystore.serialize().unwrap()).unwrap();

    assert_eq!(value["version"], 3);
    assert_eq!(value["hdPathString"], DEFAULT_HD_PATH);
    assert_eq!(value["hdIndex"], 1);
    assert!(value["encSeed"]["encStr"].is_string());
    assert!(value["encSeed"]["nonce"].is_string());
    assert!(value["encHdRootPriv"]["encStr"].is_string());
    assert!(value.get("encRootPriv").is_none());

    let address = value["addresses"][0].as_str().unwrap();
    assert_eq!(address.len(), 64);
    assert!(value["encPrivKeys"][address]["key"].is_string());
    assert!(value["encPrivKeys"][address]["nonce"].is_string());
}

#[test]
fn test_version_gate() {
    let (keystore, _) =
        Keystore::create_vault("pw", TEST_MNEMONIC, DEFAULT_HD_PATH, &fast_kdf()).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&keystore.serialize().unwrap()).unwrap();

    for dropped in 0..=DROPPED_VERSION {
        value["version"] = dropped.into();
        assert!(Keystore::deserialize(&value.to_string()).unwrap().is_none());
    }

    value["version"] = 2.into();
    let err = Keystore::deserialize(&value.to_string()).unwrap_err();
    assert!(matches!(
        err,
        KeystoreError::NeedsUpgrade {
            found: 2,
            current: CURRENT_VERSION
        }
    ));

    value["version"] = CURRENT_VERSION.into();
    assert!(Keystore::deserialize(&value.to_string()).unwrap().is_some());

    // A legacy document without a version field is treated as dropped
    assert!(Keystore::deserialize(r#"{"keyHash":"abc"}"#).unwrap().is_none());
}

#[test]
fn test_password_rotation_preserves_content() {
    let kdf = fast_kdf();
    let (mut keystore, old_key) =
        Keystore::create_vault("old", TEST_MNEMONIC, DEFAULT_HD_PATH, &kdf).unwrap();
    keystore.generate_new_keys(&old_key, 3).unwrap();
    keystore
        .import_root_private_key(&old_key, TEST_MNEMONIC, &WordsParams::default())
        .unwrap();

    let before: Vec<String> = keystore
        .addresses()
        .iter()
        .map(|a| {
            keystore
                .export_hd_private_key(a, &old_key)
                .unwrap()
                .expose_secret()
                .to_string()
        })
        .collect();
    let root_before = keystore
        .export_root_private_key(&old_key)
        .unwrap()
        .expose_secret()
        .to_string();

    let new_key = keystore.derive_key("new", &kdf).unwrap();
    keystore.re_encrypt_keys(&old_key, &new_key).unwrap();

    let after: Vec<String> = keystore
        .addresses()
        .iter()
        .map(|a| {
            keystore
                .export_hd_private_key(a, &new_key)
                .unwrap()
                .expose_secret()
                .to_string()
        })
        .collect();
    assert_eq!(before, after);
    assert_eq!(
        keystore
            .export_root_private_key(&new_key)
            .unwrap()
            .expose_secret(),
        root_before
    );
    assert_eq!(
        keystore.get_seed(&new_key).unwrap().expose_secret(),
        TEST_MNEMONIC
    );

    // The old key opens nothing any more
    assert!(!keystore.is_derived_key_correct(&old_key));
    assert!(matches!(
        keystore.export_hd_private_key(&keystore.addresses()[0], &old_key),
        Err(KeystoreError::IncorrectDerivedKey)
    ));
    assert!(matches!(
        keystore.export_root_private_key(&old_key),
        Err(KeystoreError::IncorrectDerivedKey)
    ));
}

#[test]
fn test_alternate_root_uses_its_own_dictionary() {
    let kdf = fast_kdf();
    let (mut keystore, derived_key) =
        Keystore::create_vault("pw", TEST_MNEMONIC, DEFAULT_HD_PATH, &kdf).unwrap();

    let params = WordsParams::new(24, keyvault::Language::Spanish);
    let alt = Mnemonic::generate_with(&params).unwrap();

    // English parse of a Spanish phrase fails
    assert!(matches!(
        keystore.import_root_private_key(&derived_key, alt.phrase(), &WordsParams::english(24)),
        Err(KeystoreError::InvalidMnemonic(_))
    ));

    let address = keystore
        .import_root_private_key(&derived_key, alt.phrase(), &params)
        .unwrap();
    let keys: SignKeys = keystore.export_root_sign_keys(&derived_key).unwrap();
    assert_eq!(keys.address(), address);

    // The alternate root is independent of the HD addresses
    assert!(!keystore.addresses().contains(&address));
}

#[test]
fn test_builder_with_words_params() {
    let params = WordsParams::english(24);
    let phrase = Mnemonic::generate_with(&params).unwrap();
    let (keystore, derived_key) = KeystoreBuilder::new("pw", phrase.phrase())
        .words_params(params)
        .hd_path("m/44'/1'/0'/0")
        .build(&fast_kdf())
        .unwrap();

    assert_eq!(keystore.hd_path(), "m/44'/1'/0'/0");
    assert_eq!(
        keystore.get_seed(&derived_key).unwrap().expose_secret(),
        phrase.phrase()
    );
}
