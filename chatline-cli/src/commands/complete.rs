//! Complete command - rank completions against an emote catalog.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chatline_completion::{CatalogFile, CompletionItem, CompletionPopup, EmoteRanker};
use chatline_core::{Channel, SimpleChannel};
use chatline_store::SettingsStore;
use clap::{Args, ValueEnum};
use serde::Serialize;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the complete command.
#[derive(Args)]
pub struct CompleteArgs {
    /// What to complete.
    pub kind: CompleteKind,

    /// Text typed so far, without the leading ':' or '@'.
    pub text: String,

    /// Catalog file with emote sets, emoji and channels.
    #[arg(long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Chat channel from the catalog to complete in.
    #[arg(long, required_unless_present = "whispers", conflicts_with = "whispers")]
    pub channel: Option<String>,

    /// Complete in the whispers split instead of a chat channel.
    #[arg(long)]
    pub whispers: bool,

    /// Maximum number of rows (defaults to the configured limit).
    #[arg(long)]
    pub max: Option<usize>,
}

/// What to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompleteKind {
    /// Emotes and emoji.
    Emotes,
    /// Usernames of known chatters.
    Users,
}

/// JSON form of one popup row.
#[derive(Debug, Serialize)]
struct RowOutput<'a> {
    label: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    emote_id: Option<&'a str>,
    selected: bool,
}

/// Runs the complete command.
pub async fn run(args: &CompleteArgs, cli: &Cli) -> Result<()> {
    let file = CatalogFile::load(&args.catalog)
        .await
        .with_context(|| format!("failed to load catalog {}", args.catalog.display()))?;

    let channel: Box<dyn Channel> = match (&args.channel, args.whispers) {
        (Some(name), _) => Box::new(file.channel(name)?),
        (None, true) => Box::new(SimpleChannel::whispers()),
        (None, false) => anyhow::bail!("either --channel or --whispers is required"),
    };

    let max_entries = match args.max {
        Some(0) => anyhow::bail!("--max must be at least 1"),
        Some(max) => max,
        None => {
            SettingsStore::load(cli.paths().settings_path())
                .await
                .completion_max_entries()
                .await
        }
    };

    let mut popup = CompletionPopup::new(EmoteRanker::new(max_entries));
    match args.kind {
        CompleteKind::Emotes => popup.update_emotes(&args.text, channel.as_ref(), &file.catalog()),
        CompleteKind::Users => popup.update_users(&args.text, channel.as_ref()),
    }

    print_rows(&popup, cli)
}

fn print_rows(popup: &CompletionPopup, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            print!("{}", TextFormatter::new(!cli.no_color).rows(popup.items(), popup.selected()));
        }
        OutputFormat::Json => {
            let rows: Vec<RowOutput<'_>> = popup
                .items()
                .iter()
                .enumerate()
                .map(|(i, item)| row_output(item, popup.selected() == Some(i)))
                .collect();
            println!("{}", JsonFormatter::new(cli.pretty).format(&rows)?);
        }
    }
    Ok(())
}

fn row_output(item: &CompletionItem, selected: bool) -> RowOutput<'_> {
    RowOutput {
        label: &item.label,
        text: &item.text,
        emote_id: item.emote.as_ref().and_then(|e| e.id.as_deref()),
        selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatline_core::Emote;
    use std::sync::Arc;

    #[test]
    fn test_row_output_json() {
        let mut emote = Emote::named("Kappa");
        emote.id = Some("25".to_string());
        let item = CompletionItem {
            emote: Some(Arc::new(emote)),
            label: "Kappa - Twitch Emote".to_string(),
            text: "Kappa".to_string(),
        };

        let json = serde_json::to_value(row_output(&item, true)).unwrap();
        assert_eq!(json["label"], "Kappa - Twitch Emote");
        assert_eq!(json["emote_id"], "25");
        assert_eq!(json["selected"], true);

        let user = CompletionItem {
            emote: None,
            label: "forsen".to_string(),
            text: "forsen".to_string(),
        };
        let json = serde_json::to_value(row_output(&user, false)).unwrap();
        assert!(json.get("emote_id").is_none());
    }
}
