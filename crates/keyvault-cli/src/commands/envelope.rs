//! Envelope encryption commands

use super::common::{build_prompt, open_controller};
use anyhow::{anyhow, Context, Result};
use keyvault::{multi_decrypt, multi_encrypt, BoxPublicKey, EncryptedEnvelope, ExposeSecret};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Encrypt input for every recipient key
pub async fn encrypt(
    home: &Path,
    recipients: &[String],
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    index: u32,
    passphrase_file: Option<PathBuf>,
) -> Result<()> {
    let recipients = recipients
        .iter()
        .map(|hex| {
            BoxPublicKey::from_hex(hex).with_context(|| format!("Invalid recipient key: {}", hex))
        })
        .collect::<Result<Vec<_>>>()?;
    let plaintext = read_input(input.as_deref())?;

    let prompt = build_prompt(passphrase_file.as_deref())?;
    let controller = open_controller(home, prompt, true).await?;

    let envelope = controller
        .with_unlocked("encrypt", false, |keystore, derived_key| {
            multi_encrypt(keystore, derived_key, &plaintext, &recipients, Some(index))
        })
        .await??;

    let json = serde_json::to_string_pretty(&envelope)?;
    write_output(output.as_deref(), json.as_bytes())?;
    tracing::info!(recipients = recipients.len(), "Wrote envelope");
    Ok(())
}

/// Decrypt an envelope from `sender`
pub async fn decrypt(
    home: &Path,
    sender: &str,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    index: u32,
    passphrase_file: Option<PathBuf>,
) -> Result<()> {
    let sender = BoxPublicKey::from_hex(sender)
        .with_context(|| format!("Invalid sender key: {}", sender))?;
    let raw = read_input(input.as_deref())?;
    let envelope: EncryptedEnvelope =
        serde_json::from_slice(&raw).context("Failed to parse envelope")?;

    let prompt = build_prompt(passphrase_file.as_deref())?;
    let controller = open_controller(home, prompt, true).await?;

    let plaintext = controller
        .with_unlocked("decrypt", false, |keystore, derived_key| {
            multi_decrypt(keystore, derived_key, &envelope, &sender, Some(index))
        })
        .await??
        .ok_or_else(|| {
            anyhow!("Envelope is not addressed to this key or was not sent by the given sender")
        })?;

    write_output(output.as_deref(), plaintext.expose_secret())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
            stdout.flush()?;
            Ok(())
        }
    }
}
