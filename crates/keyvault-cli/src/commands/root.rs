//! Alternate root key commands

use super::common::{build_prompt, get_mnemonic, open_controller, words_params, TerminalPrompt};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Import a root key from a mnemonic with its own word list
pub async fn import(
    home: &Path,
    mnemonic_file: Option<PathBuf>,
    words: usize,
    language: &str,
    passphrase_file: Option<PathBuf>,
) -> Result<()> {
    let params = words_params(words, language)?;
    let prompt = build_prompt(passphrase_file.as_deref())?;
    let controller = open_controller(home, prompt, true).await?;

    let mnemonic = get_mnemonic(mnemonic_file.as_deref())?;
    let address = controller.import_root_private_key(&mnemonic, &params).await?;

    println!("Imported root key.");
    println!("  Address: {}", address);
    Ok(())
}

/// Remove the root key
pub async fn delete(home: &Path) -> Result<()> {
    let controller = open_controller(home, Arc::new(TerminalPrompt), true).await?;
    controller.delete_root_private_key().await?;
    println!("Root key removed.");
    Ok(())
}
