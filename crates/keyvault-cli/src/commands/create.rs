//! Wallet creation command

use super::common::{
    display_mnemonic_warning, get_mnemonic, get_new_passphrase, open_controller, words_params,
    TerminalPrompt,
};
use anyhow::{anyhow, Result};
use keyvault::{ExposeSecret, Mnemonic, SecretString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Execute the create command
pub async fn execute(
    home: &Path,
    restore: bool,
    mnemonic_file: Option<PathBuf>,
    passphrase_file: Option<PathBuf>,
    words: usize,
    language: &str,
) -> Result<()> {
    let controller = open_controller(home, Arc::new(TerminalPrompt), false).await?;
    if controller.has_wallet().await {
        return Err(anyhow!(
            "A wallet already exists. Delete it first with 'keyvault delete'."
        ));
    }

    let (mnemonic, params) = if restore || mnemonic_file.is_some() {
        let phrase = get_mnemonic(mnemonic_file.as_deref())?;
        let word_count = phrase.expose_secret().split_whitespace().count();
        (phrase, words_params(word_count, language)?)
    } else {
        let params = words_params(words, language)?;
        println!("Generating new {}-word mnemonic phrase...", params.word_count);
        let generated = Mnemonic::generate_with(&params)
            .map_err(|e| anyhow!("Failed to generate mnemonic: {}", e))?;
        display_mnemonic_warning(generated.phrase());
        (SecretString::from(generated.phrase().to_string()), params)
    };

    let passphrase = get_new_passphrase(
        passphrase_file.as_deref(),
        "Enter passphrase for wallet encryption: ",
    )?;

    println!("Deriving wallet keys (this takes a moment)...");
    let address = controller
        .create_wallet(&passphrase, &mnemonic, Some(params))
        .await?;

    println!();
    println!("Wallet created.");
    println!("  Address: {}", address);
    println!("  HD path: {}", controller.config().hd_path);
    Ok(())
}
