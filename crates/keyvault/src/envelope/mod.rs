//! Multi-recipient envelope encryption
//!
//! The payload is sealed once under a fresh random symmetric key; that key is
//! then sealed separately to every recipient with the asymmetric box, using
//! the sender's per-address keypair. A recipient tries every wrapped key
//! against the sender's public key until one opens.

mod error;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::{EnvelopeError, EnvelopeResult};

use crate::keystore::{DerivedKey, Keystore};
use crate::sealed::{asymmetric, symmetric, BoxError, BoxPublicKey, OptionalOpen, SealedBox};
use crate::secure::SecretBytes;

/// Envelope format version
pub const ENVELOPE_VERSION: u32 = 1;

/// Algorithm tag for the per-recipient key wrap
pub const ASYM_ALG: &str = "x25519-xchacha20poly1305";

/// Algorithm tag for the payload
pub const SYM_ALG: &str = "xchacha20poly1305";

/// Ciphertext and nonce, both base64
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    pub nonce: String,
    pub ciphertext: String,
}

impl EncryptedPayload {
    fn from_sealed(sealed: &SealedBox) -> Self {
        Self {
            nonce: sealed.nonce_base64(),
            ciphertext: sealed.ciphertext_base64(),
        }
    }

    fn to_sealed(&self) -> EnvelopeResult<SealedBox> {
        SealedBox::from_base64(&self.ciphertext, &self.nonce)
            .map_err(|e| EnvelopeError::Encoding(e.to_string()))
    }
}

/// Payload encrypted once for several recipients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    pub version: u32,
    pub asym_alg: String,
    pub sym_alg: String,
    pub sym_nonce: String,
    pub sym_enc_message: String,
    /// One wrapped key per recipient, in recipient order
    pub encrypted_sym_key: Vec<EncryptedPayload>,
}

impl EncryptedEnvelope {
    fn check_supported(&self) -> EnvelopeResult<()> {
        if self.version != ENVELOPE_VERSION {
            return Err(EnvelopeError::UnsupportedEnvelope(format!(
                "version {}",
                self.version
            )));
        }
        if self.asym_alg != ASYM_ALG || self.sym_alg != SYM_ALG {
            return Err(EnvelopeError::UnsupportedEnvelope(format!(
                "algorithms {}/{}",
                self.asym_alg, self.sym_alg
            )));
        }
        Ok(())
    }

    fn payload(&self) -> EnvelopeResult<SealedBox> {
        SealedBox::from_base64(&self.sym_enc_message, &self.sym_nonce)
            .map_err(|e| EnvelopeError::Encoding(e.to_string()))
    }
}

/// Encrypt `plaintext` for every key in `recipients`
///
/// The sender identity is the address at `hd_index` (default 0).
pub fn multi_encrypt(
    keystore: &Keystore,
    derived_key: &DerivedKey,
    plaintext: &[u8],
    recipients: &[BoxPublicKey],
    hd_index: Option<u32>,
) -> EnvelopeResult<EncryptedEnvelope> {
    if recipients.is_empty() {
        return Err(EnvelopeError::EmptyRecipientList);
    }

    let my_keys = keystore.box_keypair(derived_key, hd_index.unwrap_or(0))?;

    let sym_key = symmetric::generate_key();
    let payload = symmetric::seal(plaintext, sym_key.expose_secret())?;

    let encrypted_sym_key = recipients
        .iter()
        .map(|their_public| {
            asymmetric::seal(sym_key.expose_secret(), &my_keys, their_public)
                .map(|sealed| EncryptedPayload::from_sealed(&sealed))
        })
        .collect::<Result<Vec<_>, BoxError>>()?;

    debug!(recipients = recipients.len(), "Sealed envelope");

    Ok(EncryptedEnvelope {
        version: ENVELOPE_VERSION,
        asym_alg: ASYM_ALG.to_string(),
        sym_alg: SYM_ALG.to_string(),
        sym_nonce: payload.nonce_base64(),
        sym_enc_message: payload.ciphertext_base64(),
        encrypted_sym_key,
    })
}

/// Decrypt an envelope sent by `their_public`
///
/// Returns `Ok(None)` when no wrapped key opens for this identity, or when
/// the payload does not authenticate under the recovered key.
pub fn multi_decrypt(
    keystore: &Keystore,
    derived_key: &DerivedKey,
    envelope: &EncryptedEnvelope,
    their_public: &BoxPublicKey,
    hd_index: Option<u32>,
) -> EnvelopeResult<Option<SecretBytes>> {
    envelope.check_supported()?;
    let my_keys = keystore.box_keypair(derived_key, hd_index.unwrap_or(0))?;

    let mut sym_key = None;
    for (position, wrapped) in envelope.encrypted_sym_key.iter().enumerate() {
        // Entries for other recipients may be in any shape; skip what does not parse
        let sealed = match wrapped.to_sealed() {
            Ok(sealed) => sealed,
            Err(e) => {
                debug!(position, error = %e, "Skipping malformed envelope entry");
                continue;
            }
        };
        if let Some(key) = asymmetric::open(&sealed, &my_keys, their_public).optional()? {
            sym_key = Some(key);
            break;
        }
    }

    let Some(sym_key) = sym_key else {
        debug!(
            entries = envelope.encrypted_sym_key.len(),
            "No envelope entry opened for this identity"
        );
        return Ok(None);
    };

    let payload = envelope.payload()?;
    Ok(symmetric::open(&payload, sym_key.expose_secret()).optional()?)
}

/// Encrypt a string directly to one recipient
pub fn asym_encrypt_string(
    keystore: &Keystore,
    derived_key: &DerivedKey,
    message: &str,
    their_public: &BoxPublicKey,
    hd_index: Option<u32>,
) -> EnvelopeResult<EncryptedPayload> {
    let my_keys = keystore.box_keypair(derived_key, hd_index.unwrap_or(0))?;
    let sealed = asymmetric::seal(message.as_bytes(), &my_keys, their_public)?;
    Ok(EncryptedPayload::from_sealed(&sealed))
}

/// Decrypt a string sealed by [`asym_encrypt_string`]
///
/// `Ok(None)` when the box was not sealed between these two keys.
pub fn asym_decrypt_string(
    keystore: &Keystore,
    derived_key: &DerivedKey,
    encrypted: &EncryptedPayload,
    their_public: &BoxPublicKey,
    hd_index: Option<u32>,
) -> EnvelopeResult<Option<String>> {
    let my_keys = keystore.box_keypair(derived_key, hd_index.unwrap_or(0))?;
    let sealed = encrypted.to_sealed()?;

    match asymmetric::open(&sealed, &my_keys, their_public).optional()? {
        Some(plain) => String::from_utf8(plain.expose_secret().clone())
            .map(Some)
            .map_err(|e| EnvelopeError::Encoding(e.to_string())),
        None => Ok(None),
    }
}

/// Box public key of the address at `hd_index`
pub fn public_encrypt_key(
    keystore: &Keystore,
    derived_key: &DerivedKey,
    hd_index: Option<u32>,
) -> EnvelopeResult<BoxPublicKey> {
    Ok(keystore
        .box_keypair(derived_key, hd_index.unwrap_or(0))?
        .public_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::{KeystoreError, ScryptKdf, ScryptParams};
    use crate::mnemonic::{Mnemonic, WordsParams, DEFAULT_HD_PATH};

    fn identity() -> (Keystore, DerivedKey) {
        let kdf = ScryptKdf::new(ScryptParams {
            log_n: 8,
            ..ScryptParams::default()
        });
        let mnemonic = Mnemonic::generate_with(&WordsParams::default()).unwrap();
        Keystore::create_vault("pw", mnemonic.phrase(), DEFAULT_HD_PATH, &kdf).unwrap()
    }

    #[test]
    fn test_multi_encrypt_requires_recipients() {
        let (ks, dk) = identity();
        let result = multi_encrypt(&ks, &dk, b"payload", &[], None);
        assert!(matches!(result, Err(EnvelopeError::EmptyRecipientList)));
    }

    #[test]
    fn test_envelope_shape() {
        let (sender, sender_dk) = identity();
        let (a, a_dk) = identity();
        let (b, b_dk) = identity();
        let recipients = [
            public_encrypt_key(&a, &a_dk, None).unwrap(),
            public_encrypt_key(&b, &b_dk, None).unwrap(),
        ];

        let envelope = multi_encrypt(&sender, &sender_dk, b"payload", &recipients, None).unwrap();
        assert_eq!(envelope.version, ENVELOPE_VERSION);
        assert_eq!(envelope.encrypted_sym_key.len(), 2);

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["asymAlg"], ASYM_ALG);
        assert!(value.get("symEncMessage").is_some());
        assert!(value["encryptedSymKey"][0].get("nonce").is_some());
    }

    #[test]
    fn test_recipient_decrypts_non_recipient_gets_none() {
        let (sender, sender_dk) = identity();
        let (a, a_dk) = identity();
        let (d, d_dk) = identity();
        let sender_public = public_encrypt_key(&sender, &sender_dk, None).unwrap();
        let recipients = [public_encrypt_key(&a, &a_dk, None).unwrap()];

        let envelope = multi_encrypt(&sender, &sender_dk, b"secret", &recipients, None).unwrap();

        let opened = multi_decrypt(&a, &a_dk, &envelope, &sender_public, None)
            .unwrap()
            .unwrap();
        assert_eq!(opened.expose_secret().as_slice(), b"secret");

        assert!(multi_decrypt(&d, &d_dk, &envelope, &sender_public, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unsupported_envelope_version() {
        let (sender, sender_dk) = identity();
        let me = public_encrypt_key(&sender, &sender_dk, None).unwrap();
        let mut envelope = multi_encrypt(&sender, &sender_dk, b"x", &[me], None).unwrap();
        envelope.version = 2;
        assert!(matches!(
            multi_decrypt(&sender, &sender_dk, &envelope, &me, None),
            Err(EnvelopeError::UnsupportedEnvelope(_))
        ));
    }

    #[test]
    fn test_asym_string_roundtrip() {
        let (alice, alice_dk) = identity();
        let (bob, bob_dk) = identity();
        let alice_public = public_encrypt_key(&alice, &alice_dk, None).unwrap();
        let bob_public = public_encrypt_key(&bob, &bob_dk, None).unwrap();

        let sealed = asym_encrypt_string(&alice, &alice_dk, "hi bob", &bob_public, None).unwrap();
        let opened = asym_decrypt_string(&bob, &bob_dk, &sealed, &alice_public, None).unwrap();
        assert_eq!(opened.as_deref(), Some("hi bob"));

        // Wrong counterparty is a soft failure
        let (carol, carol_dk) = identity();
        let carol_public = public_encrypt_key(&carol, &carol_dk, None).unwrap();
        assert!(asym_decrypt_string(&bob, &bob_dk, &sealed, &carol_public, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_public_key_matches_address() {
        let (ks, dk) = identity();
        let keys = ks.export_hd_sign_keys(&dk, 0).unwrap();
        let from_address = keys.public_key.box_public_key().unwrap();
        assert_eq!(public_encrypt_key(&ks, &dk, Some(0)).unwrap(), from_address);
    }

    #[test]
    fn test_wrong_derived_key_is_hard_error() {
        let (ks, _) = identity();
        let (_, other_dk) = identity();
        assert!(matches!(
            public_encrypt_key(&ks, &other_dk, None),
            Err(EnvelopeError::Keystore(KeystoreError::IncorrectDerivedKey))
        ));
    }
}
