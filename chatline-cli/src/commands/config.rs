//! Config command - manage configuration.

use anyhow::{Context, Result};
use chatline_store::{SettingsStore, StorageMode};
use clap::{Args, Subcommand};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Use the OS keyring for secrets (Linux only; ignored elsewhere).
    SetKeyring {
        /// true to use the keyring, false for the local file.
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Set the maximum number of completion rows.
    SetMaxEntries {
        /// Row limit, at least 1.
        count: usize,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::SetKeyring { enabled } => set_keyring(*enabled, cli).await,
        ConfigAction::SetMaxEntries { count } => set_max_entries(*count, cli).await,
    }
}

async fn load_store(cli: &Cli) -> SettingsStore {
    SettingsStore::load(cli.paths().settings_path()).await
}

async fn show_config(cli: &Cli) -> Result<()> {
    let paths = cli.paths();
    let settings = load_store(cli).await.get().await;
    let mode = StorageMode::select(&paths, &settings);

    match cli.format {
        OutputFormat::Text => {
            let rows = [
                ("Use keyring", settings.use_keyring.to_string()),
                ("Secrets stored in", mode.to_string()),
                ("Completion rows", settings.completion_max_entries.to_string()),
                ("Log level", settings.log_level.to_string()),
            ];
            print!("{}", TextFormatter::new(!cli.no_color).table("Chatline Configuration", &rows));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let paths = cli.paths();

    match cli.format {
        OutputFormat::Text => {
            let rows = [
                ("Settings dir", paths.settings_dir().display().to_string()),
                ("Settings file", paths.settings_path().display().to_string()),
                ("Credentials", paths.credentials_path().display().to_string()),
                ("Portable", paths.is_portable().to_string()),
            ];
            print!("{}", TextFormatter::new(!cli.no_color).table("Configuration Paths", &rows));
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "settings_dir": paths.settings_dir().display().to_string(),
                "settings_file": paths.settings_path().display().to_string(),
                "credentials_file": paths.credentials_path().display().to_string(),
                "portable": paths.is_portable(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }

    Ok(())
}

async fn set_keyring(enabled: bool, cli: &Cli) -> Result<()> {
    let store = load_store(cli).await;
    store.set_use_keyring(enabled).await;
    store.save().await.context("failed to save settings")?;

    info!(enabled, "Keyring setting updated");
    if !cli.quiet {
        println!("Use keyring: {enabled}");
    }
    Ok(())
}

async fn set_max_entries(count: usize, cli: &Cli) -> Result<()> {
    let store = load_store(cli).await;
    store.set_completion_max_entries(count).await?;
    store.save().await.context("failed to save settings")?;

    info!(count, "Completion row limit updated");
    if !cli.quiet {
        println!("Completion rows: {count}");
    }
    Ok(())
}
