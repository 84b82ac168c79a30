// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Chatline Core
//!
//! Core types and models shared by the Chatline crates.
//!
//! ## Key Types
//!
//! ### Emotes
//! - [`Emote`] / [`EmotePtr`] - A single emote image handle
//! - [`EmoteMap`] - Ordered name-to-emote collection
//! - [`EmojiData`] / [`EmojiMap`] - Emoji table with short codes
//! - [`EmoteProvider`] - Third-party emote providers
//!
//! ### Channels
//! - [`Channel`] - Channel abstraction with capability queries
//! - [`ChannelKind`] - What kind of channel a split shows
//! - [`ChatChannel`] / [`SimpleChannel`] - Concrete channels
//! - [`ChatterIndex`] - Case-insensitive username index

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    // Channels
    Channel,
    ChannelEmotes,
    ChannelKind,
    ChatChannel,
    ChatterIndex,
    SimpleChannel,
    // Emotes
    EmojiData,
    EmojiMap,
    Emote,
    EmoteMap,
    EmotePtr,
    EmoteProvider,
};
