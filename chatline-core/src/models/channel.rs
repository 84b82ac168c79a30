//! Channel types.
//!
//! A split shows one [`Channel`]. Completion only needs to know what a
//! channel can offer, so capabilities are exposed as optional accessors
//! instead of concrete channel types:
//! - [`Channel::emotes`] - channel-local third-party emotes (live chat channels)
//! - [`Channel::chatters`] - the chatter username index

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::chatters::ChatterIndex;
use super::emote::{EmoteMap, EmoteProvider};

// ============================================================================
// Channel Kind
// ============================================================================

/// What a channel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Empty split.
    #[default]
    None,
    /// Direct messages.
    Direct,
    /// A live chat channel.
    Chat,
    /// Whispers with other users.
    Whispers,
    /// The channel currently being watched.
    Watching,
    /// Mentions of the current user.
    Mentions,
    /// Live notifications.
    Live,
    /// AutoMod queue.
    Automod,
    /// IRC channel.
    Irc,
    /// Anything else.
    Misc,
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChannelKind::None => "none",
            ChannelKind::Direct => "direct",
            ChannelKind::Chat => "chat",
            ChannelKind::Whispers => "whispers",
            ChannelKind::Watching => "watching",
            ChannelKind::Mentions => "mentions",
            ChannelKind::Live => "live",
            ChannelKind::Automod => "automod",
            ChannelKind::Irc => "irc",
            ChannelKind::Misc => "misc",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Channel Emotes
// ============================================================================

/// Channel-local third-party emote sets.
#[derive(Debug, Clone, Default)]
pub struct ChannelEmotes {
    /// 7TV channel emotes.
    pub seventv: Option<Arc<EmoteMap>>,
    /// BetterTTV channel emotes.
    pub bttv: Option<Arc<EmoteMap>>,
    /// FrankerFaceZ channel emotes.
    pub ffz: Option<Arc<EmoteMap>>,
}

impl ChannelEmotes {
    /// Returns the channel emote set loaded for `provider`.
    pub fn get(&self, provider: EmoteProvider) -> Option<&Arc<EmoteMap>> {
        match provider {
            EmoteProvider::SevenTv => self.seventv.as_ref(),
            EmoteProvider::BetterTtv => self.bttv.as_ref(),
            EmoteProvider::FrankerFaceZ => self.ffz.as_ref(),
        }
    }

    /// Replaces the channel emote set for `provider`.
    pub fn set(&mut self, provider: EmoteProvider, emotes: Option<Arc<EmoteMap>>) {
        match provider {
            EmoteProvider::SevenTv => self.seventv = emotes,
            EmoteProvider::BetterTtv => self.bttv = emotes,
            EmoteProvider::FrankerFaceZ => self.ffz = emotes,
        }
    }
}

// ============================================================================
// Channel Trait
// ============================================================================

/// A channel shown in a split.
pub trait Channel: Send + Sync {
    /// Channel name.
    fn name(&self) -> &str;

    /// What this channel shows.
    fn kind(&self) -> ChannelKind;

    /// Channel-local third-party emotes, for live chat channels.
    fn emotes(&self) -> Option<&ChannelEmotes> {
        None
    }

    /// Chatter username index, for channels that track chatters.
    fn chatters(&self) -> Option<&ChatterIndex> {
        None
    }
}

// ============================================================================
// Concrete Channels
// ============================================================================

/// A live chat channel with emotes and chatters.
#[derive(Debug, Clone, Default)]
pub struct ChatChannel {
    name: String,
    emotes: ChannelEmotes,
    chatters: ChatterIndex,
}

impl ChatChannel {
    /// Creates a chat channel with no emotes or chatters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emotes: ChannelEmotes::default(),
            chatters: ChatterIndex::default(),
        }
    }

    /// Builder-style setter for a provider's channel emotes.
    #[must_use]
    pub fn with_emotes(mut self, provider: EmoteProvider, emotes: EmoteMap) -> Self {
        self.emotes.set(provider, Some(Arc::new(emotes)));
        self
    }

    /// Builder-style setter for the chatter index.
    #[must_use]
    pub fn with_chatters(mut self, chatters: ChatterIndex) -> Self {
        self.chatters = chatters;
        self
    }

    /// Mutable access to the channel emote sets.
    pub fn emotes_mut(&mut self) -> &mut ChannelEmotes {
        &mut self.emotes
    }
}

impl Channel for ChatChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ChannelKind {
        ChannelKind::Chat
    }

    fn emotes(&self) -> Option<&ChannelEmotes> {
        Some(&self.emotes)
    }

    fn chatters(&self) -> Option<&ChatterIndex> {
        Some(&self.chatters)
    }
}

/// A channel without emote or chatter capabilities.
#[derive(Debug, Clone)]
pub struct SimpleChannel {
    name: String,
    kind: ChannelKind,
}

impl SimpleChannel {
    /// Creates a channel of the given kind.
    pub fn new(name: impl Into<String>, kind: ChannelKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The whispers split.
    pub fn whispers() -> Self {
        Self::new("/whispers", ChannelKind::Whispers)
    }
}

impl Channel for SimpleChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ChannelKind {
        self.kind
    }
}
