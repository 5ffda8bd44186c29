//! Password change command

use super::common::{build_prompt, get_new_passphrase, open_controller};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Execute the passwd command
pub async fn execute(
    home: &Path,
    passphrase_file: Option<PathBuf>,
    new_passphrase_file: Option<PathBuf>,
) -> Result<()> {
    let prompt = build_prompt(passphrase_file.as_deref())?;
    let controller = open_controller(home, prompt, true).await?;

    let new_passphrase =
        get_new_passphrase(new_passphrase_file.as_deref(), "Enter new passphrase: ")?;

    controller.change_password(&new_passphrase).await?;
    println!("Password changed.");
    Ok(())
}
