//! Emote catalog snapshots.
//!
//! The completion popup never owns emote collections; it reads the
//! snapshot held in an [`EmoteCatalog`]. [`CatalogFile`] is the JSON form
//! used to load a snapshot (plus named channels) from disk.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chatline_core::{ChatChannel, ChatterIndex, CoreError, EmojiData, EmojiMap, EmoteMap, EmoteProvider};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Emote Catalog
// ============================================================================

/// Emote collections that are not tied to one channel.
#[derive(Debug, Clone, Default)]
pub struct EmoteCatalog {
    /// Emotes the current user can use everywhere. `None` when logged out.
    pub user_emotes: Option<Arc<EmoteMap>>,
    /// Global 7TV emotes.
    pub global_seventv: Option<Arc<EmoteMap>>,
    /// Global BetterTTV emotes.
    pub global_bttv: Option<Arc<EmoteMap>>,
    /// Global FrankerFaceZ emotes.
    pub global_ffz: Option<Arc<EmoteMap>>,
    /// The emoji table.
    pub emojis: Arc<EmojiMap>,
}

impl EmoteCatalog {
    /// Returns the global emote set loaded for `provider`.
    pub fn global(&self, provider: EmoteProvider) -> Option<&Arc<EmoteMap>> {
        match provider {
            EmoteProvider::SevenTv => self.global_seventv.as_ref(),
            EmoteProvider::BetterTtv => self.global_bttv.as_ref(),
            EmoteProvider::FrankerFaceZ => self.global_ffz.as_ref(),
        }
    }

    /// Replaces the global emote set for `provider`.
    pub fn set_global(&mut self, provider: EmoteProvider, emotes: Option<Arc<EmoteMap>>) {
        match provider {
            EmoteProvider::SevenTv => self.global_seventv = emotes,
            EmoteProvider::BetterTtv => self.global_bttv = emotes,
            EmoteProvider::FrankerFaceZ => self.global_ffz = emotes,
        }
    }
}

// ============================================================================
// Catalog File
// ============================================================================

/// Per-provider emote sets as stored in a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEmotes {
    /// 7TV emotes.
    pub seventv: Option<EmoteMap>,
    /// BetterTTV emotes.
    pub bttv: Option<EmoteMap>,
    /// FrankerFaceZ emotes.
    pub ffz: Option<EmoteMap>,
}

impl ProviderEmotes {
    fn get(&self, provider: EmoteProvider) -> Option<&EmoteMap> {
        match provider {
            EmoteProvider::SevenTv => self.seventv.as_ref(),
            EmoteProvider::BetterTtv => self.bttv.as_ref(),
            EmoteProvider::FrankerFaceZ => self.ffz.as_ref(),
        }
    }
}

/// A chat channel as stored in a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelFile {
    /// Channel-local emotes.
    pub emotes: ProviderEmotes,
    /// Known chatters.
    pub chatters: ChatterIndex,
}

/// JSON form of an emote catalog plus named chat channels.
///
/// ```json
/// {
///   "user_emotes": [{"name": "Kappa"}],
///   "global": {"bttv": [{"name": "monkaS"}]},
///   "emojis": [{"unified": "😂", "short_codes": ["joy"]}],
///   "channels": {"forsen": {"emotes": {"seventv": []}, "chatters": ["Forsen"]}}
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    /// Current user's emotes.
    pub user_emotes: Option<EmoteMap>,
    /// Global third-party emotes.
    pub global: ProviderEmotes,
    /// Emoji table.
    pub emojis: Vec<EmojiData>,
    /// Chat channels by name.
    pub channels: BTreeMap<String, ChannelFile>,
}

impl CatalogFile {
    /// Parses a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialization`] if `json` is not a valid catalog.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, CoreError> {
        debug!(path = %path.display(), "Loading emote catalog");
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// Builds the catalog snapshot.
    pub fn catalog(&self) -> EmoteCatalog {
        let mut catalog = EmoteCatalog {
            user_emotes: self.user_emotes.clone().map(Arc::new),
            emojis: Arc::new(self.emojis.iter().cloned().map(Arc::new).collect()),
            ..EmoteCatalog::default()
        };
        for &provider in EmoteProvider::all() {
            catalog.set_global(provider, self.global.get(provider).cloned().map(Arc::new));
        }
        catalog
    }

    /// Builds the chat channel called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ChannelNotFound`] if the catalog has no such channel.
    pub fn channel(&self, name: &str) -> Result<ChatChannel, CoreError> {
        let file = self
            .channels
            .get(name)
            .ok_or_else(|| CoreError::ChannelNotFound(name.to_string()))?;

        let mut channel = ChatChannel::new(name).with_chatters(file.chatters.clone());
        for &provider in EmoteProvider::all() {
            channel
                .emotes_mut()
                .set(provider, file.emotes.get(provider).cloned().map(Arc::new));
        }
        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatline_core::Channel;

    const CATALOG: &str = r#"{
        "user_emotes": [{"name": "Kappa", "id": "25"}],
        "global": {"bttv": [{"name": "monkaS"}], "ffz": []},
        "emojis": [{"unified": "😂", "short_codes": ["joy"]}],
        "channels": {
            "forsen": {
                "emotes": {"seventv": [{"name": "forsenE"}]},
                "chatters": ["Forsen", "xqc"]
            }
        }
    }"#;

    #[test]
    fn test_catalog_snapshot() {
        let file = CatalogFile::from_json(CATALOG).unwrap();
        let catalog = file.catalog();

        assert!(catalog.user_emotes.as_ref().unwrap().get("Kappa").is_some());
        assert_eq!(catalog.global(EmoteProvider::BetterTtv).unwrap().len(), 1);
        assert!(catalog.global(EmoteProvider::FrankerFaceZ).unwrap().is_empty());
        assert!(catalog.global(EmoteProvider::SevenTv).is_none());
        assert_eq!(catalog.emojis.len(), 1);
    }

    #[test]
    fn test_catalog_channel() {
        let file = CatalogFile::from_json(CATALOG).unwrap();
        let channel = file.channel("forsen").unwrap();

        assert_eq!(channel.name(), "forsen");
        let emotes = channel.emotes().unwrap();
        assert!(emotes.get(EmoteProvider::SevenTv).unwrap().get("forsenE").is_some());
        assert!(emotes.get(EmoteProvider::BetterTtv).is_none());
        assert_eq!(channel.chatters().unwrap().len(), 2);

        assert!(matches!(
            file.channel("nobody"),
            Err(CoreError::ChannelNotFound(name)) if name == "nobody"
        ));
    }

    #[test]
    fn test_empty_catalog() {
        let file = CatalogFile::from_json("{}").unwrap();
        let catalog = file.catalog();
        assert!(catalog.user_emotes.is_none());
        assert!(catalog.emojis.is_empty());
    }

    #[tokio::test]
    async fn test_load_catalog_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        tokio::fs::write(&path, CATALOG).await.unwrap();

        let file = CatalogFile::load(&path).await.unwrap();
        assert!(file.channels.contains_key("forsen"));
    }

    #[tokio::test]
    async fn test_load_invalid_catalog() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        tokio::fs::write(&path, r#"{"emojis": 5}"#).await.unwrap();

        assert!(matches!(CatalogFile::load(&path).await, Err(CoreError::Serialization(_))));
        assert!(matches!(
            CatalogFile::load(&temp_dir.path().join("missing.json")).await,
            Err(CoreError::Io(_))
        ));
    }
}
