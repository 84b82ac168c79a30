//! Emote-related types.
//!
//! This module contains the read-only emote collections the completion
//! popup ranks against:
//! - [`Emote`] / [`EmotePtr`] - A single emote
//! - [`EmoteMap`] - Emotes keyed by their lookup name
//! - [`EmojiData`] / [`EmojiMap`] - Emoji with their short codes
//! - [`EmoteProvider`] - Third-party emote providers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// Emote
// ============================================================================

/// A single emote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emote {
    /// Name as typed in chat.
    pub name: String,
    /// Provider-specific identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Tooltip shown on hover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl Emote {
    /// Creates an emote with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            url: None,
            tooltip: None,
        }
    }
}

/// Shared handle to an emote.
pub type EmotePtr = Arc<Emote>;

// ============================================================================
// Emote Map
// ============================================================================

/// Emotes keyed by lookup name.
///
/// Iteration is ordered by lookup name so that ranking over one map is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Emote>", into = "Vec<Emote>")]
pub struct EmoteMap {
    emotes: BTreeMap<String, EmotePtr>,
}

impl EmoteMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an emote under its own name, replacing any previous entry.
    pub fn insert(&mut self, emote: Emote) -> Option<EmotePtr> {
        let name = emote.name.clone();
        self.emotes.insert(name, Arc::new(emote))
    }

    /// Returns the emote registered under `name`.
    pub fn get(&self, name: &str) -> Option<&EmotePtr> {
        self.emotes.get(name)
    }

    /// Iterates `(lookup name, emote)` pairs in lookup-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EmotePtr)> {
        self.emotes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of emotes.
    pub fn len(&self) -> usize {
        self.emotes.len()
    }

    /// Returns true if the map holds no emotes.
    pub fn is_empty(&self) -> bool {
        self.emotes.is_empty()
    }
}

impl FromIterator<Emote> for EmoteMap {
    fn from_iter<I: IntoIterator<Item = Emote>>(iter: I) -> Self {
        let mut map = Self::new();
        for emote in iter {
            map.insert(emote);
        }
        map
    }
}

impl From<Vec<Emote>> for EmoteMap {
    fn from(emotes: Vec<Emote>) -> Self {
        emotes.into_iter().collect()
    }
}

impl From<EmoteMap> for Vec<Emote> {
    fn from(map: EmoteMap) -> Self {
        map.emotes.into_values().map(|e| (*e).clone()).collect()
    }
}

// ============================================================================
// Emoji
// ============================================================================

/// An emoji with every short code it answers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEmoji", into = "RawEmoji")]
pub struct EmojiData {
    /// The emoji text itself.
    pub unified: String,
    /// Short codes without surrounding colons, e.g. `joy`.
    pub short_codes: Vec<String>,
    /// Emote handle rendered for this emoji.
    pub emote: EmotePtr,
}

impl EmojiData {
    /// Creates emoji data, deriving the emote handle from the emoji text.
    pub fn new(unified: impl Into<String>, short_codes: Vec<String>) -> Self {
        let unified = unified.into();
        let emote = Arc::new(Emote {
            name: unified.clone(),
            id: None,
            url: None,
            tooltip: short_codes.first().map(|c| format!(":{c}:")),
        });
        Self {
            unified,
            short_codes,
            emote,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawEmoji {
    unified: String,
    #[serde(default)]
    short_codes: Vec<String>,
}

impl From<RawEmoji> for EmojiData {
    fn from(raw: RawEmoji) -> Self {
        Self::new(raw.unified, raw.short_codes)
    }
}

impl From<EmojiData> for RawEmoji {
    fn from(data: EmojiData) -> Self {
        Self {
            unified: data.unified,
            short_codes: data.short_codes,
        }
    }
}

/// The emoji table, in table order.
pub type EmojiMap = Vec<Arc<EmojiData>>;

// ============================================================================
// Emote Provider
// ============================================================================

/// Third-party emote providers with channel-local and global sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmoteProvider {
    /// 7TV
    SevenTv,
    /// BetterTTV
    BetterTtv,
    /// FrankerFaceZ
    FrankerFaceZ,
}

impl EmoteProvider {
    /// Returns all providers in completion order.
    pub fn all() -> &'static [EmoteProvider] {
        &[Self::SevenTv, Self::BetterTtv, Self::FrankerFaceZ]
    }

    /// Returns the display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SevenTv => "7TV",
            Self::BetterTtv => "BetterTTV",
            Self::FrankerFaceZ => "FrankerFaceZ",
        }
    }

    /// Source label for the provider's channel-local emotes.
    pub fn channel_label(&self) -> &'static str {
        match self {
            Self::SevenTv => "Channel 7TV",
            Self::BetterTtv => "Channel BetterTTV",
            Self::FrankerFaceZ => "Channel FrankerFaceZ",
        }
    }

    /// Source label for the provider's global emotes.
    pub fn global_label(&self) -> &'static str {
        match self {
            Self::SevenTv => "Global 7TV",
            Self::BetterTtv => "Global BetterTTV",
            Self::FrankerFaceZ => "Global FrankerFaceZ",
        }
    }
}

impl std::fmt::Display for EmoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
