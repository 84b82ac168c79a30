// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Chatline Completion
//!
//! Ranks completions for the chat input box.
//!
//! - [`EmoteRanker`] - ranks emotes, emoji and usernames for a partial word
//! - [`EmoteCatalog`] - read-only snapshot of the emote collections
//! - [`CompletionPopup`] - list state behind the completion popup
//!
//! ## Usage
//!
//! ```ignore
//! use chatline_completion::{CompletionPopup, EmoteCatalog, EmoteRanker};
//!
//! let mut popup = CompletionPopup::new(EmoteRanker::default());
//! popup.set_input_action(Box::new(|text| println!("complete {text}")));
//! popup.update_emotes("Kap", &channel, &catalog);
//! popup.show();
//! ```

pub mod catalog;
pub mod popup;
pub mod ranker;

pub use catalog::{CatalogFile, ChannelFile, EmoteCatalog, ProviderEmotes};
pub use popup::{CompletionItem, CompletionPopup, InputAction, REDRAW_INTERVAL};
pub use ranker::{Candidate, EMOJI_SOURCE, EmoteRanker, MAX_ENTRY_COUNT, MatchBuckets, USER_EMOTE_SOURCE};
