//! Keyvault CLI
//!
//! Command line front end for the password-protected HD key vault.

mod client_config;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_config::ClientConfig;
use commands::{execute_vault_command, VaultCommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the home directory
pub const KEYVAULT_HOME_ENV: &str = "KEYVAULT_HOME";

/// Home directory name under the user's home
pub const DEFAULT_HOME_DIR: &str = ".keyvault";

/// Keyvault
#[derive(Parser)]
#[command(name = "keyvault")]
#[command(version)]
#[command(about = "Password-protected HD key vault", long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Directory for config and wallet data
    #[arg(long, global = true, default_value_os_t = default_home_dir())]
    home: PathBuf,

    /// The logging level (trace|debug|info|warn|error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// The logging format (json|plain)
    #[arg(long, global = true, default_value = "plain")]
    log_format: String,

    /// Disable colored logs
    #[arg(long, global = true, default_value = "false")]
    log_no_color: bool,

    /// Print out full error chain on failure
    #[arg(long, global = true, default_value = "false")]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default vault.toml
    Init {
        /// Overwrite an existing configuration
        #[arg(long, default_value = "false")]
        overwrite: bool,
    },

    /// Print the effective configuration
    Config,

    #[command(flatten)]
    Vault(VaultCommand),
}

/// Returns the default home directory.
///
/// Resolution order:
/// 1. `KEYVAULT_HOME` environment variable (if set)
/// 2. `~/.keyvault` (default)
fn default_home_dir() -> PathBuf {
    if let Ok(home) = std::env::var(KEYVAULT_HOME_ENV) {
        return PathBuf::from(home);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_HOME_DIR)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, &cli.log_format, cli.log_no_color);

    let result = match cli.command {
        Commands::Init { overwrite } => cmd_init(&cli.home, overwrite),
        Commands::Config => cmd_config(&cli.home),
        Commands::Vault(command) => execute_vault_command(&cli.home, command).await,
    };

    if let Err(e) = &result {
        if cli.trace {
            eprintln!("Error: {:?}", e);
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(log_level: &str, log_format: &str, no_color: bool) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // stdout carries command output (envelopes, exported keys)
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr);

    match log_format {
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

fn cmd_init(home: &Path, overwrite: bool) -> Result<()> {
    let config_path = ClientConfig::config_path(home);
    if config_path.exists() && !overwrite {
        anyhow::bail!(
            "Configuration already exists at {}. Use --overwrite to replace.",
            config_path.display()
        );
    }

    ClientConfig::default().save(home)?;
    info!(path = %config_path.display(), "Wrote client config");
    println!("Wrote {}", config_path.display());
    Ok(())
}

fn cmd_config(home: &Path) -> Result<()> {
    let config = ClientConfig::load(home)?;
    println!("# {}", ClientConfig::config_path(home).display());
    println!("# store: {}", config.effective_store_dir(home).display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
