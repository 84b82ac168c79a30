//! Credential storage.
//!
//! Secrets are addressed by `(provider, name)` and stored either in the OS
//! keyring or, when the keyring is not used, in a local JSON file next to
//! the settings.
//!
//! ## Usage
//!
//! ```ignore
//! use chatline_store::{AppPaths, CredentialStore, Settings};
//!
//! let paths = AppPaths::detect();
//! let store = CredentialStore::open(&paths, &Settings::default()).await;
//!
//! store.set("twitch", "oauth_token", "abc123").await?;
//! let token = store.get("twitch", "oauth_token").await?;
//!
//! store.close().await?;
//! ```

mod backend;
mod local;
mod request;

pub use self::backend::{KeyringBackend, MemoryKeyring, SERVICE_NAME, SystemKeyring};
pub use self::local::{LocalSecretFile, SAVE_DEBOUNCE};
pub use self::request::SecretRequest;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{CredentialError, StoreError};
use crate::persistence::AppPaths;
use crate::settings_store::Settings;

/// Namespace prefixed to every credential key.
pub const KEY_NAMESPACE: &str = "chatline";

/// Separator between the parts of a credential key.
pub const KEY_DELIMITER: char = ':';

/// Builds the composite key `chatline:<provider>:<name>`.
///
/// # Panics
///
/// Panics if `provider` contains [`KEY_DELIMITER`]; provider names are
/// fixed identifiers chosen by the caller.
pub fn format_key(provider: &str, name: &str) -> String {
    assert!(
        !provider.contains(KEY_DELIMITER),
        "credential provider {provider:?} must not contain {KEY_DELIMITER:?}"
    );
    format!("{KEY_NAMESPACE}{KEY_DELIMITER}{provider}{KEY_DELIMITER}{name}")
}

// ============================================================================
// Storage Mode
// ============================================================================

/// Where secrets are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// The OS keyring.
    Keyring,
    /// The local credentials file.
    LocalFile,
}

impl StorageMode {
    /// Picks the storage mode for an installation.
    ///
    /// Portable installs keep secrets next to the installation. On Linux the
    /// keyring is a user setting; elsewhere it is always used.
    pub fn select(paths: &AppPaths, settings: &Settings) -> Self {
        if use_keyring(paths.is_portable(), settings.use_keyring) {
            StorageMode::Keyring
        } else {
            StorageMode::LocalFile
        }
    }
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Keyring => write!(f, "keyring"),
            StorageMode::LocalFile => write!(f, "local file"),
        }
    }
}

fn use_keyring(portable: bool, keyring_setting: bool) -> bool {
    if portable {
        false
    } else if cfg!(target_os = "linux") {
        keyring_setting
    } else {
        true
    }
}

// ============================================================================
// Credential Store
// ============================================================================

enum Backend {
    Keyring(Arc<dyn KeyringBackend>),
    Local(LocalSecretFile),
}

/// Secret storage for provider credentials.
///
/// Open once at startup and [`close`](Self::close) at shutdown so pending
/// local writes reach the disk. All methods must be called from within a
/// tokio runtime.
pub struct CredentialStore {
    backend: Backend,
}

impl CredentialStore {
    /// Opens the store for an installation, using the system keyring or the
    /// local credentials file as [`StorageMode::select`] decides.
    pub async fn open(paths: &AppPaths, settings: &Settings) -> Self {
        let mode = StorageMode::select(paths, settings);
        info!(mode = %mode, portable = paths.is_portable(), "Opening credential store");
        match mode {
            StorageMode::Keyring => Self::with_keyring(Arc::new(SystemKeyring::new())),
            StorageMode::LocalFile => Self::with_local_file(paths.credentials_path()).await,
        }
    }

    /// A store backed by `keyring`.
    pub fn with_keyring(keyring: Arc<dyn KeyringBackend>) -> Self {
        debug!(backend = keyring.name(), "Using keyring credential backend");
        Self {
            backend: Backend::Keyring(keyring),
        }
    }

    /// A store backed by the local credentials file at `path`.
    pub async fn with_local_file(path: impl AsRef<Path>) -> Self {
        let file = LocalSecretFile::open(path.as_ref()).await;
        Self {
            backend: Backend::Local(file),
        }
    }

    /// The active storage mode.
    pub fn mode(&self) -> StorageMode {
        match self.backend {
            Backend::Keyring(_) => StorageMode::Keyring,
            Backend::Local(_) => StorageMode::LocalFile,
        }
    }

    /// The local credentials file, in local-file mode.
    pub fn local_file(&self) -> Option<&LocalSecretFile> {
        match &self.backend {
            Backend::Local(file) => Some(file),
            Backend::Keyring(_) => None,
        }
    }

    /// Looks up the secret for `provider`/`name`.
    ///
    /// Resolves to an empty string when no secret is stored.
    ///
    /// # Panics
    ///
    /// Panics if `provider` contains [`KEY_DELIMITER`].
    pub fn get(&self, provider: &str, name: &str) -> SecretRequest<String> {
        let key = format_key(provider, name);

        match &self.backend {
            Backend::Keyring(keyring) => {
                let keyring = Arc::clone(keyring);
                SecretRequest::spawn(async move {
                    let secret = keyring.read(&key).await?;
                    Ok::<_, CredentialError>(secret.unwrap_or_default())
                })
            }
            Backend::Local(file) => SecretRequest::ready(Ok(file.get(&key))),
        }
    }

    /// Stores `secret` for `provider`/`name`.
    ///
    /// Keyring writes run in the background; failures are logged and
    /// reported through the returned request.
    ///
    /// # Panics
    ///
    /// Panics if `provider` contains [`KEY_DELIMITER`].
    pub fn set(&self, provider: &str, name: &str, secret: &str) -> SecretRequest<()> {
        let key = format_key(provider, name);
        debug!(key = %key, "Storing credential");

        match &self.backend {
            Backend::Keyring(keyring) => {
                let keyring = Arc::clone(keyring);
                let secret = secret.to_owned();
                SecretRequest::spawn(async move {
                    keyring.write(&key, &secret).await.inspect_err(|e| {
                        warn!(key = %key, error = %e, "Credential was not stored");
                    })
                })
            }
            Backend::Local(file) => {
                file.set(&key, secret);
                SecretRequest::ready(Ok(()))
            }
        }
    }

    /// Removes the secret for `provider`/`name`.
    ///
    /// # Panics
    ///
    /// Panics if `provider` contains [`KEY_DELIMITER`].
    pub fn erase(&self, provider: &str, name: &str) -> SecretRequest<()> {
        let key = format_key(provider, name);
        debug!(key = %key, "Erasing credential");

        match &self.backend {
            Backend::Keyring(keyring) => {
                let keyring = Arc::clone(keyring);
                SecretRequest::spawn(async move {
                    keyring.delete(&key).await.inspect_err(|e| {
                        warn!(key = %key, error = %e, "Credential was not erased");
                    })
                })
            }
            Backend::Local(file) => {
                file.erase(&key);
                SecretRequest::ready(Ok(()))
            }
        }
    }

    /// Writes pending local changes now.
    ///
    /// # Errors
    ///
    /// Returns error if the local credentials file cannot be written.
    pub async fn flush(&self) -> Result<(), StoreError> {
        match &self.backend {
            Backend::Local(file) => file.flush().await,
            Backend::Keyring(_) => Ok(()),
        }
    }

    /// Flushes and closes the store.
    ///
    /// # Errors
    ///
    /// Returns error if the local credentials file cannot be written.
    pub async fn close(self) -> Result<(), StoreError> {
        self.flush().await?;
        debug!(mode = %self.mode(), "Closed credential store");
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Keyring whose reads never complete.
    struct StalledKeyring;

    #[async_trait]
    impl KeyringBackend for StalledKeyring {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn read(&self, _key: &str) -> Result<Option<String>, CredentialError> {
            std::future::pending().await
        }

        async fn write(&self, _key: &str, _secret: &str) -> Result<(), CredentialError> {
            Ok(())
        }

        async fn delete(&self, _key: &str) -> Result<(), CredentialError> {
            Ok(())
        }
    }

    fn memory_store() -> (CredentialStore, Arc<MemoryKeyring>) {
        let keyring = Arc::new(MemoryKeyring::new());
        (CredentialStore::with_keyring(keyring.clone()), keyring)
    }

    #[test]
    fn test_format_key() {
        assert_eq!(format_key("twitch", "oauth"), "chatline:twitch:oauth");
        assert_eq!(format_key("twitch", "a:b"), "chatline:twitch:a:b");
    }

    #[test]
    #[should_panic(expected = "must not contain")]
    fn test_format_key_rejects_delimiter_in_provider() {
        let _ = format_key("twi:tch", "oauth");
    }

    #[test]
    fn test_use_keyring_truth_table() {
        assert!(!use_keyring(true, true));
        assert!(!use_keyring(true, false));
        assert!(use_keyring(false, true));
        assert_eq!(use_keyring(false, false), !cfg!(target_os = "linux"));
    }

    #[test]
    fn test_storage_mode_select() {
        let settings = Settings::default();
        assert_eq!(
            StorageMode::select(&AppPaths::portable("/opt/chatline"), &settings),
            StorageMode::LocalFile
        );
        assert_eq!(
            StorageMode::select(&AppPaths::installed("/tmp/chatline"), &settings),
            StorageMode::Keyring
        );
    }

    #[tokio::test]
    async fn test_open_portable_uses_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AppPaths::portable(temp_dir.path());

        let store = CredentialStore::open(&paths, &Settings::default()).await;
        assert_eq!(store.mode(), StorageMode::LocalFile);
        assert_eq!(store.local_file().unwrap().path(), paths.credentials_path());
    }

    #[tokio::test]
    async fn test_keyring_set_get_erase() {
        let (store, keyring) = memory_store();

        store.set("twitch", "oauth", "abc123").await.unwrap();
        assert_eq!(keyring.len(), 1);
        assert_eq!(store.get("twitch", "oauth").await.unwrap(), "abc123");

        store.erase("twitch", "oauth").await.unwrap();
        assert_eq!(store.get("twitch", "oauth").await.unwrap(), "");
        assert!(keyring.is_empty());
    }

    #[tokio::test]
    async fn test_keyring_missing_secret_is_empty() {
        let (store, _) = memory_store();
        assert_eq!(store.get("twitch", "nobody").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_keyring_fire_and_forget_set() {
        let (store, keyring) = memory_store();

        drop(store.set("twitch", "oauth", "abc"));

        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while keyring.is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(store.get("twitch", "oauth").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_keyring_failure_is_reported() {
        let store = CredentialStore::with_keyring(Arc::new(MemoryKeyring::unavailable("dbus")));

        assert!(matches!(
            store.set("twitch", "oauth", "abc").await,
            Err(CredentialError::Unavailable(_))
        ));
        assert!(store.erase("twitch", "oauth").await.is_err());
        assert!(store.get("twitch", "oauth").await.is_err());
    }

    #[tokio::test]
    async fn test_stalled_request_can_be_cancelled() {
        let store = CredentialStore::with_keyring(Arc::new(StalledKeyring));

        let request = store.get("twitch", "oauth");
        assert!(!request.is_finished());
        request.cancel();
        assert!(matches!(request.await, Err(CredentialError::Cancelled)));
    }

    #[tokio::test]
    async fn test_local_set_get_erase() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::with_local_file(temp_dir.path().join("credentials.json")).await;

        let request = store.set("twitch", "oauth", "abc123");
        assert!(request.is_finished());
        request.await.unwrap();
        assert_eq!(store.get("twitch", "oauth").await.unwrap(), "abc123");

        store.erase("twitch", "oauth").await.unwrap();
        assert_eq!(store.get("twitch", "oauth").await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_local_close_persists_pending_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");

        let store = CredentialStore::with_local_file(&path).await;
        store.set("twitch", "oauth", "abc").await.unwrap();
        store.set("twitch", "refresh", "def").await.unwrap();
        store.close().await.unwrap();

        let reopened = CredentialStore::with_local_file(&path).await;
        assert_eq!(reopened.get("twitch", "oauth").await.unwrap(), "abc");
        assert_eq!(reopened.get("twitch", "refresh").await.unwrap(), "def");
    }

    #[tokio::test]
    async fn test_local_file_uses_composite_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("credentials.json");

        let store = CredentialStore::with_local_file(&path).await;
        store.set("twitch", "oauth", "abc").await.unwrap();
        store.flush().await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["chatline:twitch:oauth"], "abc");
    }
}
