//! Wallet commands for the keyvault CLI
//!
//! - `create`: Create a wallet from a fresh or existing mnemonic
//! - `show`: Print addresses and keystore metadata (no password)
//! - `add-keys`, `export`, `public-key`: HD address management
//! - `encrypt`, `decrypt`: Multi-recipient envelopes
//! - `passwd`: Re-encrypt the wallet under a new password
//! - `import-root`, `delete-root`: Alternate root key
//! - `delete`: Remove the stored wallet
//!
//! Passwords are read from the terminal without echo unless a
//! `--passphrase-file` is given.

pub mod common;
pub mod create;
pub mod delete;
pub mod envelope;
pub mod keys;
pub mod passwd;
pub mod root;
pub mod show;

use anyhow::Result;
use clap::Subcommand;
use std::path::{Path, PathBuf};

/// Vault subcommands
#[derive(Subcommand)]
pub enum VaultCommand {
    /// Create a new wallet
    ///
    /// Generates a new mnemonic unless `--mnemonic-file` or `--restore` is
    /// given. The mnemonic is shown ONCE: write it down.
    Create {
        /// Restore from an existing mnemonic read from the terminal
        #[arg(long)]
        restore: bool,

        /// Read the mnemonic from file instead of generating one
        #[arg(long, conflicts_with = "restore")]
        mnemonic_file: Option<PathBuf>,

        /// Read passphrase from file instead of prompting
        #[arg(long)]
        passphrase_file: Option<PathBuf>,

        /// Word count of a generated mnemonic
        #[arg(long, default_value = "12")]
        words: usize,

        /// Mnemonic dictionary (english, spanish, french, ...)
        #[arg(long, default_value = "english")]
        language: String,
    },

    /// Show wallet addresses and metadata
    ///
    /// Only reads public information; never asks for the password.
    Show {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Derive additional HD addresses
    AddKeys {
        /// Number of addresses to add
        #[arg(long, default_value = "1")]
        count: u32,

        /// Read passphrase from file instead of prompting
        #[arg(long)]
        passphrase_file: Option<PathBuf>,
    },

    /// Export secret material
    ///
    /// Prints a private key (hex) or the mnemonic to stdout.
    Export {
        /// Address whose private key to export
        #[arg(long, required_unless_present_any = ["root", "mnemonic"])]
        address: Option<String>,

        /// Export the alternate root private key
        #[arg(long, conflicts_with_all = ["address", "mnemonic"])]
        root: bool,

        /// Export the wallet mnemonic
        #[arg(long, conflicts_with = "address")]
        mnemonic: bool,

        /// Read passphrase from file instead of prompting
        #[arg(long)]
        passphrase_file: Option<PathBuf>,
    },

    /// Print the encryption public key of an address
    PublicKey {
        /// HD index of the address
        #[arg(long, default_value = "0")]
        index: u32,

        /// Read passphrase from file instead of prompting
        #[arg(long)]
        passphrase_file: Option<PathBuf>,
    },

    /// Encrypt a message to one or more recipients
    ///
    /// Writes a JSON envelope.
    Encrypt {
        /// Recipient encryption public key (hex), repeatable
        #[arg(long = "to", required = true)]
        recipients: Vec<String>,

        /// Input file (stdin if not specified)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// HD index of the sending address
        #[arg(long, default_value = "0")]
        index: u32,

        /// Read passphrase from file instead of prompting
        #[arg(long)]
        passphrase_file: Option<PathBuf>,
    },

    /// Decrypt an envelope
    Decrypt {
        /// Sender encryption public key (hex)
        #[arg(long = "from")]
        sender: String,

        /// Envelope file (stdin if not specified)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// HD index of the receiving address
        #[arg(long, default_value = "0")]
        index: u32,

        /// Read passphrase from file instead of prompting
        #[arg(long)]
        passphrase_file: Option<PathBuf>,
    },

    /// Change the wallet password
    Passwd {
        /// Read the current passphrase from file instead of prompting
        #[arg(long)]
        passphrase_file: Option<PathBuf>,

        /// Read the new passphrase from file instead of prompting
        #[arg(long)]
        new_passphrase_file: Option<PathBuf>,
    },

    /// Import an alternate root key from a mnemonic
    ///
    /// The mnemonic may use a different word count and dictionary than the
    /// wallet's own.
    ImportRoot {
        /// Read the mnemonic from file instead of prompting
        #[arg(long)]
        mnemonic_file: Option<PathBuf>,

        /// Expected word count
        #[arg(long, default_value = "12")]
        words: usize,

        /// Mnemonic dictionary
        #[arg(long, default_value = "english")]
        language: String,

        /// Read passphrase from file instead of prompting
        #[arg(long)]
        passphrase_file: Option<PathBuf>,
    },

    /// Remove the alternate root key
    DeleteRoot,

    /// Delete the stored wallet
    ///
    /// Without the mnemonic the keys cannot be recovered.
    Delete {
        /// Skip the confirmation question
        #[arg(long)]
        yes: bool,
    },
}

/// Execute a vault command
pub async fn execute_vault_command(home: &Path, command: VaultCommand) -> Result<()> {
    match command {
        VaultCommand::Create {
            restore,
            mnemonic_file,
            passphrase_file,
            words,
            language,
        } => {
            create::execute(
                home,
                restore,
                mnemonic_file,
                passphrase_file,
                words,
                &language,
            )
            .await
        }

        VaultCommand::Show { format } => show::execute(home, &format).await,

        VaultCommand::AddKeys {
            count,
            passphrase_file,
        } => keys::add_keys(home, count, passphrase_file).await,

        VaultCommand::Export {
            address,
            root,
            mnemonic,
            passphrase_file,
        } => {
            let target = if root {
                keys::ExportTarget::Root
            } else if mnemonic {
                keys::ExportTarget::Mnemonic
            } else {
                keys::ExportTarget::Address(address.unwrap_or_default())
            };
            keys::export(home, target, passphrase_file).await
        }

        VaultCommand::PublicKey {
            index,
            passphrase_file,
        } => keys::public_key(home, index, passphrase_file).await,

        VaultCommand::Encrypt {
            recipients,
            input,
            output,
            index,
            passphrase_file,
        } => envelope::encrypt(home, &recipients, input, output, index, passphrase_file).await,

        VaultCommand::Decrypt {
            sender,
            input,
            output,
            index,
            passphrase_file,
        } => envelope::decrypt(home, &sender, input, output, index, passphrase_file).await,

        VaultCommand::Passwd {
            passphrase_file,
            new_passphrase_file,
        } => passwd::execute(home, passphrase_file, new_passphrase_file).await,

        VaultCommand::ImportRoot {
            mnemonic_file,
            words,
            language,
            passphrase_file,
        } => root::import(home, mnemonic_file, words, &language, passphrase_file).await,

        VaultCommand::DeleteRoot => root::delete(home).await,

        VaultCommand::Delete { yes } => delete::execute(home, yes).await,
    }
}
