//! Completion popup state.
//!
//! Holds the rows shown under the input box, the highlighted row and the
//! action run when a row is accepted. While shown, a ticker asks the view
//! to re-layout about 30 times per second so animated emotes keep moving.

use std::sync::Arc;
use std::time::Duration;

use chatline_core::{Channel, EmotePtr};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::catalog::EmoteCatalog;
use crate::ranker::EmoteRanker;

/// Interval between redraw requests while the popup is shown.
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(33);

/// Called with the completion text of an accepted row.
pub type InputAction = Box<dyn FnMut(&str) + Send>;

/// One row of the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// Emote image, absent for usernames.
    pub emote: Option<EmotePtr>,
    /// Row text.
    pub label: String,
    /// Text inserted into the input box when accepted.
    pub text: String,
}

/// State behind the input completion popup.
pub struct CompletionPopup {
    ranker: EmoteRanker,
    items: Vec<CompletionItem>,
    selected: Option<usize>,
    action: Option<InputAction>,
    redraw: Arc<watch::Sender<u64>>,
    ticker: Option<JoinHandle<()>>,
}

impl CompletionPopup {
    /// Creates a hidden, empty popup.
    pub fn new(ranker: EmoteRanker) -> Self {
        let (redraw, _) = watch::channel(0);
        Self {
            ranker,
            items: Vec::new(),
            selected: None,
            action: None,
            redraw: Arc::new(redraw),
            ticker: None,
        }
    }

    /// Replaces the rows with emotes and emoji matching `text`.
    pub fn update_emotes(&mut self, text: &str, channel: &dyn Channel, catalog: &EmoteCatalog) {
        let items = self
            .ranker
            .rank_emotes(text, channel, catalog)
            .into_iter()
            .map(|c| CompletionItem {
                label: c.label(),
                emote: c.emote,
                text: c.display,
            })
            .collect();
        self.set_items(items);
    }

    /// Replaces the rows with chatters whose name starts with `text`.
    pub fn update_users(&mut self, text: &str, channel: &dyn Channel) {
        let items = self
            .ranker
            .rank_users(text, channel)
            .into_iter()
            .map(|name| CompletionItem {
                emote: None,
                label: name.clone(),
                text: name,
            })
            .collect();
        self.set_items(items);
    }

    fn set_items(&mut self, items: Vec<CompletionItem>) {
        self.selected = if items.is_empty() { None } else { Some(0) };
        self.items = items;
        debug!(rows = self.items.len(), "Updated completion rows");
    }

    /// The current rows.
    pub fn items(&self) -> &[CompletionItem] {
        &self.items
    }

    /// Index of the highlighted row.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// The highlighted row.
    pub fn selected_item(&self) -> Option<&CompletionItem> {
        self.selected.and_then(|i| self.items.get(i))
    }

    /// Moves the highlight down, wrapping to the top.
    pub fn select_next(&mut self) {
        if let Some(i) = self.selected {
            self.selected = Some((i + 1) % self.items.len());
        }
    }

    /// Moves the highlight up, wrapping to the bottom.
    pub fn select_previous(&mut self) {
        if let Some(i) = self.selected {
            let len = self.items.len();
            self.selected = Some((i + len - 1) % len);
        }
    }

    /// Sets the action run when a row is accepted.
    pub fn set_input_action(&mut self, action: InputAction) {
        self.action = Some(action);
    }

    /// Runs the input action for the highlighted row and hides the popup.
    ///
    /// Returns false if no row is highlighted.
    pub fn accept(&mut self) -> bool {
        let Some(text) = self.selected_item().map(|item| item.text.clone()) else {
            return false;
        };

        if let Some(action) = self.action.as_mut() {
            action(&text);
        }
        self.hide();
        true
    }

    /// Shows the popup and starts the redraw ticker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&mut self) {
        if self.ticker.is_some() {
            return;
        }

        let redraw = Arc::clone(&self.redraw);
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(REDRAW_INTERVAL);
            loop {
                interval.tick().await;
                redraw.send_modify(|ticks| *ticks += 1);
            }
        }));
        debug!("Completion popup shown");
    }

    /// Hides the popup and stops the redraw ticker.
    pub fn hide(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            debug!("Completion popup hidden");
        }
    }

    /// Returns true while the popup is shown.
    pub fn is_visible(&self) -> bool {
        self.ticker.is_some()
    }

    /// Subscribes to redraw requests. The value counts ticks so far.
    pub fn subscribe_redraw(&self) -> watch::Receiver<u64> {
        self.redraw.subscribe()
    }
}

impl Drop for CompletionPopup {
    fn drop(&mut self) {
        self.hide();
    }
}

impl std::fmt::Debug for CompletionPopup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionPopup")
            .field("items", &self.items.len())
            .field("selected", &self.selected)
            .field("visible", &self.is_visible())
            .finish_non_exhaustive()
    }
}
