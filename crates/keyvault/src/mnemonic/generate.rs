//! Mnemonic phrase generation and parsing
//!
//! BIP-39 phrases in any of the standard word lists. The HD path mnemonic and
//! the alternate root-key mnemonic can use different word counts and
//! dictionaries, so parsing is always checked against a [`WordsParams`].

use super::error::{MnemonicError, MnemonicResult};
use bip39::{Language, Mnemonic as Bip39Mnemonic};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

/// Word list parameters a phrase must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordsParams {
    /// Number of words (12, 15, 18, 21 or 24)
    pub word_count: usize,
    /// BIP-39 dictionary
    pub language: Language,
}

impl WordsParams {
    /// Parameters for the given word count and dictionary
    pub fn new(word_count: usize, language: Language) -> Self {
        Self {
            word_count,
            language,
        }
    }

    /// English word list with the given word count
    pub fn english(word_count: usize) -> Self {
        Self::new(word_count, Language::English)
    }
}

impl Default for WordsParams {
    fn default() -> Self {
        Self::english(12)
    }
}

/// BIP-39 mnemonic phrase wrapper
///
/// The phrase is held as a `SecretString` so it never reaches logs; `Debug`
/// prints only the word count.
pub struct Mnemonic {
    inner: Bip39Mnemonic,
    phrase: SecretString,
}

impl Mnemonic {
    /// Generate a fresh random mnemonic
    ///
    /// # Errors
    ///
    /// Returns `MnemonicError::InvalidPhrase` for an unsupported word count
    pub fn generate_with(params: &WordsParams) -> MnemonicResult<Self> {
        let entropy_bytes = word_count_to_entropy_bytes(params.word_count)?;

        let mut entropy = vec![0u8; entropy_bytes];
        rand::thread_rng().fill_bytes(&mut entropy);

        let mnemonic = Bip39Mnemonic::from_entropy_in(params.language, &entropy);
        entropy.zeroize();
        let mnemonic = mnemonic?;

        let phrase = mnemonic.to_string();
        Ok(Self {
            inner: mnemonic,
            phrase: phrase.into(),
        })
    }

    /// Import an English phrase of any standard length
    ///
    /// Whitespace is collapsed and words are lowercased before validation.
    pub fn from_phrase(phrase: &str) -> MnemonicResult<Self> {
        let normalized = normalize(phrase);
        let mnemonic = Bip39Mnemonic::parse_in_normalized(Language::English, &normalized)?;

        Ok(Self {
            phrase: normalized.into(),
            inner: mnemonic,
        })
    }

    /// Import a phrase that must match the given word list parameters
    ///
    /// # Errors
    ///
    /// - `WordCountMismatch` if the number of words differs
    /// - `InvalidPhrase` for unknown words or a bad checksum
    pub fn from_phrase_with(phrase: &str, params: &WordsParams) -> MnemonicResult<Self> {
        let normalized = normalize(phrase);
        let actual = normalized.split(' ').filter(|w| !w.is_empty()).count();
        if actual != params.word_count {
            return Err(MnemonicError::WordCountMismatch {
                expected: params.word_count,
                actual,
            });
        }

        let mnemonic = Bip39Mnemonic::parse_in_normalized(params.language, &normalized)?;

        Ok(Self {
            phrase: normalized.into(),
            inner: mnemonic,
        })
    }

    /// Get the mnemonic phrase
    ///
    /// The returned reference should be used immediately and not stored.
    pub fn phrase(&self) -> &str {
        self.phrase.expose_secret()
    }

    /// Get the number of words in the mnemonic
    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    /// Dictionary the phrase was parsed in
    pub fn language(&self) -> Language {
        self.inner.language()
    }

    /// 64-byte BIP-39 seed (PBKDF2 over the phrase, salt "mnemonic")
    pub fn to_seed(&self) -> [u8; 64] {
        self.inner.to_seed("")
    }
}

impl std::fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count())
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert word count to entropy bytes
fn word_count_to_entropy_bytes(word_count: usize) -> MnemonicResult<usize> {
    match word_count {
        12 => Ok(16),
        15 => Ok(20),
        18 => Ok(24),
        21 => Ok(28),
        24 => Ok(32),
        _ => Err(MnemonicError::InvalidPhrase(format!(
            "invalid word count: {} (must be 12, 15, 18, 21, or 24)",
            word_count
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_24_word_mnemonic() {
        let mnemonic = Mnemonic::generate_with(&WordsParams::english(24)).unwrap();
        assert_eq!(mnemonic.word_count(), 24);
        assert_eq!(mnemonic.phrase().split(' ').count(), 24);
    }

    #[test]
    fn test_generated_phrase_parses_back() {
        let params = WordsParams::new(18, Language::Spanish);
        let mnemonic = Mnemonic::generate_with(&params).unwrap();

        let restored = Mnemonic::from_phrase_with(mnemonic.phrase(), &params).unwrap();
        assert_eq!(restored.to_seed(), mnemonic.to_seed());
        assert_eq!(restored.language(), Language::Spanish);
    }

    #[test]
    fn test_from_phrase_normalizes_whitespace_and_case() {
        let messy = "  ABANDON  abandon Abandon abandon abandon abandon abandon abandon abandon abandon abandon about \n";
        let mnemonic = Mnemonic::from_phrase(messy).unwrap();
        assert_eq!(mnemonic.phrase(), TEST_PHRASE);
    }

    #[test]
    fn test_invalid_phrase() {
        let result = Mnemonic::from_phrase("this is not a valid mnemonic phrase at all");
        assert!(matches!(result, Err(MnemonicError::InvalidPhrase(_))));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(Mnemonic::from_phrase(phrase).is_err());
    }

    #[test]
    fn test_word_count_mismatch() {
        let result = Mnemonic::from_phrase_with(TEST_PHRASE, &WordsParams::english(24));
        assert!(matches!(
            result,
            Err(MnemonicError::WordCountMismatch {
                expected: 24,
                actual: 12
            })
        ));
    }

    #[test]
    fn test_wrong_dictionary_rejected() {
        let result = Mnemonic::from_phrase_with(TEST_PHRASE, &WordsParams::new(12, Language::French));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_output_redacted() {
        let mnemonic = Mnemonic::from_phrase(TEST_PHRASE).unwrap();
        let debug = format!("{:?}", mnemonic);

        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("abandon"));
    }

    #[test]
    fn test_invalid_word_count() {
        let result = Mnemonic::generate_with(&WordsParams::english(13));
        assert!(matches!(result, Err(MnemonicError::InvalidPhrase(_))));
    }
}
