//! Show wallet metadata

use super::common::{open_controller, TerminalPrompt};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletSummary {
    version: u32,
    hd_path: String,
    hd_index: u32,
    has_root_key: bool,
    addresses: Vec<String>,
}

/// Execute the show command
pub async fn execute(home: &Path, format: &str) -> Result<()> {
    let controller = open_controller(home, Arc::new(TerminalPrompt), true).await?;

    let summary = controller
        .with_keystore(|keystore| WalletSummary {
            version: keystore.version(),
            hd_path: keystore.hd_path().to_string(),
            hd_index: keystore.hd_index(),
            has_root_key: keystore.has_root_private_key(),
            addresses: keystore.addresses().to_vec(),
        })
        .await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "text" => {
            println!("Keystore version: {}", summary.version);
            println!("HD path:          {}", summary.hd_path);
            println!(
                "Root key:         {}",
                if summary.has_root_key { "imported" } else { "none" }
            );
            println!();
            println!("Addresses ({}):", summary.hd_index);
            for (index, address) in summary.addresses.iter().enumerate() {
                println!("  [{}] {}", index, address);
            }
        }
        other => return Err(anyhow!("Unknown format: {}. Use 'text' or 'json'", other)),
    }
    Ok(())
}
