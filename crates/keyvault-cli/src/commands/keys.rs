//! HD address commands: add, export and encryption public key

use super::common::{build_prompt, open_controller};
use anyhow::Result;
use keyvault::{public_encrypt_key, ExposeSecret};
use std::path::{Path, PathBuf};

/// Secret to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Private key of one HD address
    Address(String),
    /// Alternate root private key
    Root,
    /// Wallet mnemonic
    Mnemonic,
}

/// Derive `count` more addresses
pub async fn add_keys(home: &Path, count: u32, passphrase_file: Option<PathBuf>) -> Result<()> {
    let prompt = build_prompt(passphrase_file.as_deref())?;
    let controller = open_controller(home, prompt, true).await?;

    let first_index = controller.with_keystore(|keystore| keystore.hd_index()).await?;
    let added = controller.generate_new_keys(count).await?;

    println!("Added {} address(es):", added.len());
    for (offset, address) in added.iter().enumerate() {
        println!("  [{}] {}", first_index as usize + offset, address);
    }
    Ok(())
}

/// Print secret material to stdout
pub async fn export(
    home: &Path,
    target: ExportTarget,
    passphrase_file: Option<PathBuf>,
) -> Result<()> {
    let prompt = build_prompt(passphrase_file.as_deref())?;
    let controller = open_controller(home, prompt, true).await?;

    let secret = controller
        .with_unlocked("export secret", true, |keystore, derived_key| match &target {
            ExportTarget::Address(address) => {
                keystore.export_hd_private_key(address, derived_key)
            }
            ExportTarget::Root => keystore.export_root_private_key(derived_key),
            ExportTarget::Mnemonic => keystore.get_seed(derived_key),
        })
        .await??;

    eprintln!("WARNING: anyone holding this value controls the key.");
    println!("{}", secret.expose_secret());
    Ok(())
}

/// Print the box public key of the address at `index`
pub async fn public_key(home: &Path, index: u32, passphrase_file: Option<PathBuf>) -> Result<()> {
    let prompt = build_prompt(passphrase_file.as_deref())?;
    let controller = open_controller(home, prompt, true).await?;

    let public = controller
        .with_unlocked("read encryption key", false, |keystore, derived_key| {
            public_encrypt_key(keystore, derived_key, Some(index))
        })
        .await??;

    println!("{}", public.to_hex());
    Ok(())
}
