//! Wallet deletion command

use super::common::{open_controller, TerminalPrompt};
use anyhow::{anyhow, Result};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

/// Execute the delete command
pub async fn execute(home: &Path, yes: bool) -> Result<()> {
    let controller = open_controller(home, Arc::new(TerminalPrompt), true).await?;

    if !yes {
        print!("Delete the wallet? Keys cannot be recovered without the mnemonic. [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            return Err(anyhow!("Aborted"));
        }
    }

    controller.delete_wallet().await?;
    println!("Wallet deleted.");
    Ok(())
}
