// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Chatline CLI - credentials and input completion from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Store and read back a token
//! chatline credentials set twitch oauth_token abc123
//! chatline credentials get twitch oauth_token
//!
//! # Where do secrets live?
//! chatline credentials path
//!
//! # Rank emotes for a channel in a catalog file
//! chatline complete emotes kapp --catalog catalog.json --channel forsen
//!
//! # Rank usernames, JSON output
//! chatline complete users paj --catalog catalog.json --channel pajlada --format json
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use chatline_store::{AppPaths, LogLevel, SettingsStore};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{complete, config, credentials};

// ============================================================================
// CLI Definition
// ============================================================================

/// Chatline CLI - credential storage and input completion.
#[derive(Parser)]
#[command(name = "chatline")]
#[command(about = "Credential storage and input completion for Chatline")]
#[command(long_about = r"
Chatline keeps account secrets in the OS keyring (or a local file for
portable installs) and ranks emote, emoji and username completions.

Examples:
  chatline credentials get twitch oauth_token
  chatline credentials path
  chatline complete emotes kapp --catalog catalog.json --whispers
  chatline config show --format json
")]
#[command(version)]
#[command(author = "Chatline Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Treat the settings directory as a portable installation.
    #[arg(long, global = true)]
    pub portable: bool,

    /// Settings directory to use instead of the detected one.
    #[arg(long, global = true, value_name = "DIR")]
    pub settings_dir: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Resolves the installation paths from the global flags.
    pub fn paths(&self) -> AppPaths {
        match (&self.settings_dir, self.portable) {
            (Some(dir), true) => AppPaths::portable(dir),
            (Some(dir), false) => AppPaths::installed(dir),
            (None, true) => {
                let root = std::env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from("."));
                AppPaths::portable(root)
            }
            (None, false) => AppPaths::detect(),
        }
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Read and write stored secrets.
    #[command(visible_alias = "cred")]
    Credentials(credentials::CredentialsArgs),

    /// Rank completions against an emote catalog.
    #[command(visible_alias = "c")]
    Complete(complete::CompleteArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Filter directives: `--verbose` wins over the configured level.
fn log_directives(verbose: bool, level: LogLevel) -> String {
    if verbose {
        "chatline=debug,info".to_string()
    } else {
        format!("chatline={level}")
    }
}

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = EnvFilter::new(log_directives(verbose, level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = SettingsStore::load(cli.paths().settings_path()).await.get().await;
    setup_logging(cli.verbose, cli.quiet, settings.log_level);

    let result = match &cli.command {
        Commands::Credentials(args) => credentials::run(args, &cli).await,
        Commands::Complete(args) => complete::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
