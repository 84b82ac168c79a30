//! Local secret file.
//!
//! Fallback storage used when the OS keyring is disabled or unavailable.
//! Every secret lives in one JSON object on disk. Changes go to the
//! in-memory document first; a debounced flush writes the whole document
//! once per burst of changes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{load_json, save_json};

/// Delay between the first change of a burst and the flush.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(200);

/// The local secret document with debounced persistence.
///
/// Cloning yields another handle to the same document.
#[derive(Clone)]
pub struct LocalSecretFile {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    debounce: Duration,
    document: Mutex<Map<String, Value>>,
    save_queued: AtomicBool,
    write_lock: tokio::sync::Mutex<()>,
    flushes: watch::Sender<u64>,
}

impl LocalSecretFile {
    /// Opens the document at `path`.
    ///
    /// A missing, unreadable or malformed file opens as an empty document.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        Self::open_with_debounce(path, SAVE_DEBOUNCE).await
    }

    /// Opens the document at `path` with a custom flush delay.
    pub async fn open_with_debounce(path: impl Into<PathBuf>, debounce: Duration) -> Self {
        let path = path.into();
        let document = load_document(&path).await;

        let (flushes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                path,
                debounce,
                document: Mutex::new(document),
                save_queued: AtomicBool::new(false),
                write_lock: tokio::sync::Mutex::new(()),
                flushes,
            }),
        }
    }

    /// The file backing this document.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Returns the secret under `key`, or an empty string if absent.
    pub fn get(&self, key: &str) -> String {
        self.inner
            .document()
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    }

    /// Stores `secret` under `key` and schedules a save.
    pub fn set(&self, key: &str, secret: &str) {
        self.inner
            .document()
            .insert(key.to_owned(), Value::String(secret.to_owned()));
        self.queue_save();
    }

    /// Removes `key` and schedules a save.
    pub fn erase(&self, key: &str) {
        self.inner.document().remove(key);
        self.queue_save();
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.inner.document().len()
    }

    /// Returns true if no secrets are stored.
    pub fn is_empty(&self) -> bool {
        self.inner.document().is_empty()
    }

    /// Returns true while a save is scheduled but not yet written.
    pub fn has_pending_save(&self) -> bool {
        self.inner.save_queued.load(Ordering::SeqCst)
    }

    /// Subscribes to completed writes. The value counts writes so far.
    pub fn subscribe_flushes(&self) -> watch::Receiver<u64> {
        self.inner.flushes.subscribe()
    }

    /// Writes the document now if a save is pending.
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be written to disk.
    pub async fn flush(&self) -> Result<(), StoreError> {
        if self.has_pending_save() {
            self.inner.write().await?;
        }
        Ok(())
    }

    /// Schedules a save unless one is already scheduled.
    ///
    /// Must be called from within a tokio runtime.
    fn queue_save(&self) {
        if self.inner.save_queued.swap(true, Ordering::SeqCst) {
            return;
        }

        debug!(delay_ms = self.inner.debounce.as_millis(), "Queued credentials save");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            // flush() may already have written this burst
            if !inner.save_queued.load(Ordering::SeqCst) {
                return;
            }
            if let Err(e) = inner.write().await {
                warn!(path = %inner.path.display(), error = %e, "Failed to save credentials");
            }
        });
    }
}

impl std::fmt::Debug for LocalSecretFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSecretFile")
            .field("path", &self.inner.path)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn document(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn write(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        // Changes made from here on queue their own save.
        self.save_queued.store(false, Ordering::SeqCst);
        let snapshot = Value::Object(self.document().clone());

        save_json(&self.path, &snapshot).await?;
        self.flushes.send_modify(|count| *count += 1);

        info!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }
}

async fn load_document(path: &Path) -> Map<String, Value> {
    match load_json::<Value>(path).await {
        Ok(Value::Object(map)) => {
            debug!(path = %path.display(), entries = map.len(), "Loaded credentials file");
            map
        }
        Ok(_) => {
            warn!(path = %path.display(), "Credentials file is not a JSON object, starting empty");
            Map::new()
        }
        Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Credentials file not found, starting empty");
            Map::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read credentials file, starting empty");
            Map::new()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn wait_for_flushes(rx: &mut watch::Receiver<u64>, count: u64) {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|n| *n >= count))
            .await
            .expect("flush did not happen in time")
            .unwrap();
    }

    async fn read_file(path: &Path) -> Map<String, Value> {
        let content = tokio::fs::read_to_string(path).await.unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let file = LocalSecretFile::open(temp_dir.path().join("credentials.json")).await;

        assert!(file.is_empty());
        assert_eq!(file.get("chatline:twitch:oauth"), "");
        assert!(!file.has_pending_save());
    }

    #[tokio::test]
    async fn test_open_malformed_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let file = LocalSecretFile::open(&path).await;
        assert!(file.is_empty());

        tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();
        let file = LocalSecretFile::open(&path).await;
        assert!(file.is_empty());
    }

    #[tokio::test]
    async fn test_non_string_values_read_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        tokio::fs::write(&path, r#"{"a": "secret", "b": 12}"#).await.unwrap();

        let file = LocalSecretFile::open(&path).await;
        assert_eq!(file.get("a"), "secret");
        assert_eq!(file.get("b"), "");
        assert_eq!(file.len(), 2);
    }

    #[tokio::test]
    async fn test_burst_of_sets_is_written_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let file = LocalSecretFile::open(&path).await;
        let mut flushes = file.subscribe_flushes();

        for i in 0..10 {
            file.set(&format!("chatline:twitch:user{i}"), &format!("token{i}"));
        }
        assert!(file.has_pending_save());
        assert!(!path.exists());

        wait_for_flushes(&mut flushes, 1).await;
        // Give a second (wrong) flush the chance to happen.
        tokio::time::sleep(SAVE_DEBOUNCE * 2).await;
        assert_eq!(*flushes.borrow(), 1);

        let written = read_file(&path).await;
        assert_eq!(written.len(), 10);
        assert_eq!(written["chatline:twitch:user9"], "token9");
        assert!(!file.has_pending_save());
    }

    #[tokio::test]
    async fn test_changes_after_flush_schedule_new_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");
        let file = LocalSecretFile::open_with_debounce(&path, Duration::from_millis(20)).await;
        let mut flushes = file.subscribe_flushes();

        file.set("chatline:twitch:a", "1");
        wait_for_flushes(&mut flushes, 1).await;

        file.erase("chatline:twitch:a");
        file.set("chatline:twitch:b", "2");
        wait_for_flushes(&mut flushes, 2).await;

        let written = read_file(&path).await;
        assert!(!written.contains_key("chatline:twitch:a"));
        assert_eq!(written["chatline:twitch:b"], "2");
    }

    #[tokio::test]
    async fn test_flush_writes_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("credentials.json");
        let file = LocalSecretFile::open_with_debounce(&path, Duration::from_secs(60)).await;

        file.set("chatline:twitch:oauth", "abc");
        file.flush().await.unwrap();

        assert!(!file.has_pending_save());
        assert_eq!(read_file(&path).await["chatline:twitch:oauth"], "abc");

        // Nothing pending, nothing written.
        file.flush().await.unwrap();
        assert_eq!(*file.subscribe_flushes().borrow(), 1);
    }

    #[tokio::test]
    async fn test_reopen_sees_saved_secrets() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");

        let file = LocalSecretFile::open(&path).await;
        file.set("chatline:twitch:oauth", "abc");
        file.flush().await.unwrap();

        let reopened = LocalSecretFile::open(&path).await;
        assert_eq!(reopened.get("chatline:twitch:oauth"), "abc");
    }
}
