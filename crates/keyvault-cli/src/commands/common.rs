//! Common utilities for the vault CLI commands

use crate::client_config::ClientConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use keyvault::{
    open_store, Language, PasswordPrompt, PromptContext, ScriptedPrompt, SecretString,
    WalletController, WordsParams,
};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Minimum passphrase length for new wallets
pub const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Wrong passwords accepted before the terminal prompt gives up
pub const MAX_PROMPT_ATTEMPTS: u32 = 3;

/// Valid BIP-39 word counts
const WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Password prompt on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompt;

#[async_trait]
impl PasswordPrompt for TerminalPrompt {
    async fn request_password(&self, context: &PromptContext) -> Option<SecretString> {
        if context.attempt > MAX_PROMPT_ATTEMPTS {
            eprintln!("Too many wrong passwords");
            return None;
        }

        let prompt = format!("Password to {}: ", context.reason);
        let read = tokio::task::spawn_blocking(move || rpassword::prompt_password(prompt)).await;
        match read {
            Ok(Ok(password)) if !password.is_empty() => Some(SecretString::from(password)),
            Ok(Ok(_)) => None,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to read password");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Password prompt task failed");
                None
            }
        }
    }

    async fn notify_wrong_password(&self, _context: &PromptContext) {
        eprintln!("Wrong password, try again.");
    }
}

/// Build the prompt: a one-shot answer from `passphrase_file`, else the terminal
pub fn build_prompt(passphrase_file: Option<&Path>) -> Result<Arc<dyn PasswordPrompt>> {
    match passphrase_file {
        Some(file) => {
            let passphrase = read_passphrase_from_file(file)?;
            Ok(Arc::new(ScriptedPrompt::once(&passphrase)))
        }
        None => Ok(Arc::new(TerminalPrompt)),
    }
}

/// Open the configured store and load the wallet
///
/// Fails when `require_wallet` is set and nothing is stored.
pub async fn open_controller(
    home: &Path,
    prompt: Arc<dyn PasswordPrompt>,
    require_wallet: bool,
) -> Result<WalletController> {
    let config = ClientConfig::load(home)?;
    let backend = config.effective_store_backend()?;
    let store_dir = config.effective_store_dir(home);
    let store = open_store(backend, &store_dir)
        .with_context(|| format!("Failed to open {} store at {}", backend, store_dir.display()))?;

    tracing::debug!(%backend, dir = %store_dir.display(), "Opened store");

    let controller = WalletController::new(config.wallet, store, prompt);
    let loaded = controller.load().await?;
    if require_wallet && !loaded {
        return Err(anyhow!(
            "No wallet found in {}. Run 'keyvault create' first.",
            store_dir.display()
        ));
    }
    Ok(controller)
}

/// Read a new passphrase from file or prompt with confirmation
pub fn get_new_passphrase(passphrase_file: Option<&Path>, prompt: &str) -> Result<SecretString> {
    let passphrase = match passphrase_file {
        Some(file) => read_passphrase_from_file(file)?,
        None => prompt_new_passphrase(prompt)?,
    };

    validate_passphrase_strength(&passphrase)?;
    Ok(SecretString::from(passphrase.to_string()))
}

/// Read passphrase from a file
pub fn read_passphrase_from_file(path: &Path) -> Result<Zeroizing<String>> {
    let content = Zeroizing::new(
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read passphrase file: {}", path.display()))?,
    );

    let passphrase = Zeroizing::new(content.trim().to_string());

    if passphrase.is_empty() {
        return Err(anyhow!("Passphrase file is empty"));
    }

    Ok(passphrase)
}

fn prompt_new_passphrase(prompt: &str) -> Result<Zeroizing<String>> {
    let passphrase =
        Zeroizing::new(rpassword::prompt_password(prompt).context("Failed to read passphrase")?);

    let confirmation = Zeroizing::new(
        rpassword::prompt_password("Confirm passphrase: ")
            .context("Failed to read passphrase confirmation")?,
    );

    if *passphrase != *confirmation {
        return Err(anyhow!("Passphrases do not match"));
    }

    Ok(passphrase)
}

/// Reject passphrases shorter than [`MIN_PASSPHRASE_LENGTH`]
pub fn validate_passphrase_strength(passphrase: &str) -> Result<()> {
    if passphrase.chars().count() < MIN_PASSPHRASE_LENGTH {
        return Err(anyhow!(
            "Passphrase must be at least {} characters",
            MIN_PASSPHRASE_LENGTH
        ));
    }
    Ok(())
}

/// Read mnemonic from file or prompt interactively
pub fn get_mnemonic(mnemonic_file: Option<&Path>) -> Result<SecretString> {
    let mnemonic = match mnemonic_file {
        Some(file) => {
            let content = Zeroizing::new(
                fs::read_to_string(file)
                    .with_context(|| format!("Failed to read mnemonic file: {}", file.display()))?,
            );
            normalize_phrase(&content)
        }
        None => prompt_mnemonic()?,
    };

    check_word_count(&mnemonic)?;
    Ok(SecretString::from(mnemonic.to_string()))
}

fn prompt_mnemonic() -> Result<Zeroizing<String>> {
    println!("Enter your mnemonic phrase (12, 15, 18, 21, or 24 words):");
    print!("> ");
    io::stdout().flush()?;

    let mut line = Zeroizing::new(String::new());
    io::stdin().read_line(&mut line)?;
    Ok(normalize_phrase(&line))
}

/// Collapse whitespace between words
fn normalize_phrase(raw: &str) -> Zeroizing<String> {
    Zeroizing::new(raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn check_word_count(phrase: &str) -> Result<()> {
    let word_count = phrase.split_whitespace().count();
    if phrase.is_empty() {
        return Err(anyhow!("Mnemonic is empty"));
    }
    if !WORD_COUNTS.contains(&word_count) {
        return Err(anyhow!(
            "Invalid mnemonic: expected 12, 15, 18, 21, or 24 words, got {}",
            word_count
        ));
    }
    Ok(())
}

/// Parse a BIP-39 dictionary name
pub fn parse_language(name: &str) -> Result<Language> {
    let language = match name.to_lowercase().as_str() {
        "english" | "en" => Language::English,
        "spanish" | "es" => Language::Spanish,
        "french" | "fr" => Language::French,
        "italian" | "it" => Language::Italian,
        "japanese" | "ja" => Language::Japanese,
        "korean" | "ko" => Language::Korean,
        "czech" | "cs" => Language::Czech,
        "portuguese" | "pt" => Language::Portuguese,
        "chinese-simplified" | "zh-hans" => Language::SimplifiedChinese,
        "chinese-traditional" | "zh-hant" => Language::TraditionalChinese,
        other => return Err(anyhow!("Unknown mnemonic language: {}", other)),
    };
    Ok(language)
}

/// Word list parameters from CLI flags
pub fn words_params(word_count: usize, language: &str) -> Result<WordsParams> {
    if !WORD_COUNTS.contains(&word_count) {
        return Err(anyhow!(
            "Invalid word count {}, expected 12, 15, 18, 21, or 24",
            word_count
        ));
    }
    Ok(WordsParams::new(word_count, parse_language(language)?))
}

/// Display a warning about storing the mnemonic securely
pub fn display_mnemonic_warning(phrase: &str) {
    println!();
    println!("==================================================================");
    println!("IMPORTANT: Write down this mnemonic phrase and store it securely!");
    println!("It is the only way to recover the wallet if the password is lost.");
    println!("==================================================================");
    println!();
    println!("{}", phrase);
    println!();
}
