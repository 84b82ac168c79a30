//! Completion ranking.
//!
//! Candidates are collected source by source into two buckets: prefix
//! matches and substring-only matches. The final list is every prefix
//! match followed by every substring match, each in source order, with at
//! most one exact match moved to the front.

use chatline_core::{Channel, ChannelKind, EmojiMap, EmoteMap, EmotePtr, EmoteProvider};
use tracing::trace;

use crate::catalog::EmoteCatalog;

/// Default maximum number of completion entries.
pub const MAX_ENTRY_COUNT: usize = 200;

/// Source label for the current user's emotes.
pub const USER_EMOTE_SOURCE: &str = "Twitch Emote";

/// Source label for emoji.
pub const EMOJI_SOURCE: &str = "Emoji";

// ============================================================================
// Candidate
// ============================================================================

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Emote image, if the candidate is an emote or emoji.
    pub emote: Option<EmotePtr>,
    /// Text shown and inserted.
    pub display: String,
    /// Where the candidate came from, e.g. `Channel 7TV`.
    pub source: String,
}

impl Candidate {
    /// Row label, e.g. `Kappa - Twitch Emote`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.display, self.source)
    }
}

// ============================================================================
// Match Buckets
// ============================================================================

/// Collects candidates for one input text.
#[derive(Debug)]
pub struct MatchBuckets {
    text: String,
    needle: String,
    prefix: Vec<Candidate>,
    substring: Vec<Candidate>,
}

impl MatchBuckets {
    /// Starts collecting matches for `text`.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            needle: text.to_lowercase(),
            prefix: Vec::new(),
            substring: Vec::new(),
        }
    }

    /// Classifies one candidate by its lookup string.
    ///
    /// Returns false if `lookup` does not contain the text at all.
    pub fn add(&mut self, lookup: &str, display: &str, emote: Option<&EmotePtr>, source: &str) -> bool {
        let lookup = lookup.to_lowercase();
        let bucket = if lookup.starts_with(&self.needle) {
            &mut self.prefix
        } else if lookup.contains(&self.needle) {
            &mut self.substring
        } else {
            return false;
        };

        bucket.push(Candidate {
            emote: emote.cloned(),
            display: display.to_owned(),
            source: source.to_owned(),
        });
        true
    }

    /// Adds every emote in `map`, in map order.
    pub fn add_emotes(&mut self, map: &EmoteMap, source: &str) {
        for (lookup, emote) in map.iter() {
            self.add(lookup, &emote.name, Some(emote), source);
        }
    }

    /// Adds every short code of every emoji, in table order.
    pub fn add_emojis(&mut self, emojis: &EmojiMap) {
        for emoji in emojis {
            for code in &emoji.short_codes {
                self.add(code, code, Some(&emoji.emote), EMOJI_SOURCE);
            }
        }
    }

    /// Number of prefix matches so far.
    pub fn prefix_len(&self) -> usize {
        self.prefix.len()
    }

    /// Number of substring-only matches so far.
    pub fn substring_len(&self) -> usize {
        self.substring.len()
    }

    /// Produces the ranked list, at most `max_entries` long.
    pub fn finish(self, max_entries: usize) -> Vec<Candidate> {
        let mut candidates = self.prefix;
        candidates.extend(self.substring);

        promote_exact_match(&mut candidates, &self.text);
        candidates.truncate(max_entries);
        candidates
    }
}

/// Moves the first exact match after index 0 to the front.
///
/// A candidate matches if its display text equals `text`, or `:` followed
/// by `text` (emotes like `:)`), ignoring case. Index 0 is never checked,
/// so a later duplicate of an exact match at the front still moves ahead
/// of it.
fn promote_exact_match(candidates: &mut [Candidate], text: &str) {
    let needle = text.to_lowercase();
    let colon_needle = format!(":{needle}");
    let is_exact = |c: &Candidate| {
        let display = c.display.to_lowercase();
        display == needle || display == colon_needle
    };

    if let Some(offset) = candidates.iter().skip(1).position(is_exact) {
        candidates[..=offset + 1].rotate_right(1);
    }
}

// ============================================================================
// Emote Ranker
// ============================================================================

/// Ranks completions for the chat input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmoteRanker {
    max_entries: usize,
}

impl Default for EmoteRanker {
    fn default() -> Self {
        Self::new(MAX_ENTRY_COUNT)
    }
}

impl EmoteRanker {
    /// Creates a ranker returning at most `max_entries` candidates.
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }

    /// Maximum number of candidates returned.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Returns true if emote completion is offered in `channel`.
    pub fn accepts_emotes(channel: &dyn Channel) -> bool {
        channel.emotes().is_some() || channel.kind() == ChannelKind::Whispers
    }

    /// Ranks emotes and emoji matching `text` for `channel`.
    ///
    /// Sources, in order: the current user's emotes; for chat channels the
    /// channel's 7TV, BetterTTV and FrankerFaceZ emotes followed by the
    /// global sets of the same providers; then the emoji table.
    pub fn rank_emotes(&self, text: &str, channel: &dyn Channel, catalog: &EmoteCatalog) -> Vec<Candidate> {
        if !Self::accepts_emotes(channel) {
            trace!(channel = channel.name(), kind = %channel.kind(), "No emote completion for channel");
            return Vec::new();
        }

        let mut buckets = MatchBuckets::new(text);

        if let Some(user_emotes) = &catalog.user_emotes {
            buckets.add_emotes(user_emotes, USER_EMOTE_SOURCE);
        }

        if let Some(channel_emotes) = channel.emotes() {
            for &provider in EmoteProvider::all() {
                if let Some(map) = channel_emotes.get(provider) {
                    buckets.add_emotes(map, provider.channel_label());
                }
            }
            for &provider in EmoteProvider::all() {
                if let Some(map) = catalog.global(provider) {
                    buckets.add_emotes(map, provider.global_label());
                }
            }
        }

        buckets.add_emojis(&catalog.emojis);

        trace!(
            text = %text,
            prefix = buckets.prefix_len(),
            substring = buckets.substring_len(),
            "Ranked emote completions"
        );
        buckets.finish(self.max_entries)
    }

    /// Ranks chatter names starting with `text` in `channel`.
    pub fn rank_users(&self, text: &str, channel: &dyn Channel) -> Vec<String> {
        let Some(chatters) = channel.chatters() else {
            return Vec::new();
        };

        let mut names = chatters.filter_by_prefix(text);
        names.truncate(self.max_entries);
        names
    }
}

// ============================================================================
// Tests
// ============================================================================
