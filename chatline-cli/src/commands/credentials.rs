//! Credentials command - read and write stored secrets.

use anyhow::{Context, Result};
use chatline_store::credentials::KEY_DELIMITER;
use chatline_store::{CredentialStore, SettingsStore, StorageMode};
use clap::{Args, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the credentials command.
#[derive(Args)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub action: CredentialsAction,
}

/// Credentials subcommands.
#[derive(Subcommand)]
pub enum CredentialsAction {
    /// Print a stored secret (empty if none).
    Get {
        /// Provider, e.g. "twitch".
        provider: String,
        /// Secret name, e.g. "oauth_token".
        name: String,
    },

    /// Store a secret.
    Set {
        /// Provider, e.g. "twitch".
        provider: String,
        /// Secret name, e.g. "oauth_token".
        name: String,
        /// The secret. Read from stdin when omitted.
        secret: Option<String>,
    },

    /// Remove a stored secret.
    Erase {
        /// Provider, e.g. "twitch".
        provider: String,
        /// Secret name, e.g. "oauth_token".
        name: String,
    },

    /// Show where secrets are stored.
    Path,
}

/// Runs the credentials command.
pub async fn run(args: &CredentialsArgs, cli: &Cli) -> Result<()> {
    let paths = cli.paths();
    let settings = SettingsStore::load(paths.settings_path()).await.get().await;

    if let CredentialsAction::Path = args.action {
        return show_path(cli, StorageMode::select(&paths, &settings), &paths);
    }

    let store = CredentialStore::open(&paths, &settings).await;
    let result = match &args.action {
        CredentialsAction::Get { provider, name } => get(&store, provider, name, cli).await,
        CredentialsAction::Set { provider, name, secret } => {
            set(&store, provider, name, secret.as_deref()).await
        }
        CredentialsAction::Erase { provider, name } => erase(&store, provider, name).await,
        CredentialsAction::Path => Ok(()),
    };

    store.close().await.context("failed to save credentials")?;
    result
}

fn check_provider(provider: &str) -> Result<()> {
    if provider.is_empty() || provider.contains(KEY_DELIMITER) {
        anyhow::bail!("Invalid provider {provider:?}: must be non-empty and not contain {KEY_DELIMITER:?}");
    }
    Ok(())
}

async fn get(store: &CredentialStore, provider: &str, name: &str, cli: &Cli) -> Result<()> {
    check_provider(provider)?;
    let secret = store
        .get(provider, name)
        .await
        .with_context(|| format!("failed to read {provider}/{name}"))?;

    match cli.format {
        OutputFormat::Text => println!("{secret}"),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "provider": provider,
                "name": name,
                "secret": secret,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

async fn set(store: &CredentialStore, provider: &str, name: &str, secret: Option<&str>) -> Result<()> {
    check_provider(provider)?;
    let secret = match secret {
        Some(secret) => secret.to_owned(),
        None => read_secret_from_stdin().await?,
    };

    store
        .set(provider, name, &secret)
        .await
        .with_context(|| format!("failed to store {provider}/{name}"))?;

    info!(provider, name, "Credential stored");
    Ok(())
}

async fn erase(store: &CredentialStore, provider: &str, name: &str) -> Result<()> {
    check_provider(provider)?;
    store
        .erase(provider, name)
        .await
        .with_context(|| format!("failed to erase {provider}/{name}"))?;

    info!(provider, name, "Credential erased");
    Ok(())
}

async fn read_secret_from_stdin() -> Result<String> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read secret from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

fn show_path(cli: &Cli, mode: StorageMode, paths: &chatline_store::AppPaths) -> Result<()> {
    let credentials_file = (mode == StorageMode::LocalFile).then(|| paths.credentials_path());

    match cli.format {
        OutputFormat::Text => {
            let mut rows = vec![
                ("Settings dir", paths.settings_dir().display().to_string()),
                ("Portable", paths.is_portable().to_string()),
                ("Storage", mode.to_string()),
            ];
            if let Some(file) = &credentials_file {
                rows.push(("Credentials file", file.display().to_string()));
            }
            print!("{}", TextFormatter::new(!cli.no_color).table("Credential Storage", &rows));
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "settings_dir": paths.settings_dir().display().to_string(),
                "portable": paths.is_portable(),
                "storage": mode.to_string(),
                "credentials_file": credentials_file.map(|p| p.display().to_string()),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}
