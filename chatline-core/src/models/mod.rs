//! Domain models for Chatline.
//!
//! - [`emote`] - Emotes, emoji and emote providers
//! - [`channel`] - Channels and their capabilities
//! - [`chatters`] - Chatter username index

pub mod channel;
pub mod chatters;
pub mod emote;

pub use channel::{Channel, ChannelEmotes, ChannelKind, ChatChannel, SimpleChannel};
pub use chatters::ChatterIndex;
pub use emote::{EmojiData, EmojiMap, Emote, EmoteMap, EmotePtr, EmoteProvider};
