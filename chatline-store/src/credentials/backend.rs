//! OS keyring backends.
//!
//! [`SystemKeyring`] uses the platform's secure credential storage through
//! the `keyring` crate:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! [`MemoryKeyring`] keeps entries in process, for tests and diagnostics.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::error::CredentialError;

/// Keyring service name all Chatline entries live under.
pub const SERVICE_NAME: &str = "chatline";

// ============================================================================
// Keyring Backend Trait
// ============================================================================

/// A secret keeper addressed by composite credential keys.
#[async_trait]
pub trait KeyringBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Reads the secret stored under `key`.
    ///
    /// # Returns
    /// * `Ok(Some(secret))` - Secret found
    /// * `Ok(None)` - No entry for `key`
    /// * `Err(e)` - Error accessing the keyring
    async fn read(&self, key: &str) -> Result<Option<String>, CredentialError>;

    /// Stores `secret` under `key`, replacing any previous value.
    async fn write(&self, key: &str, secret: &str) -> Result<(), CredentialError>;

    /// Deletes the entry under `key`. Deleting a missing entry succeeds.
    async fn delete(&self, key: &str) -> Result<(), CredentialError>;
}

// ============================================================================
// System Keyring
// ============================================================================

/// The OS keyring.
///
/// Keyring calls block (and may show a password prompt), so each one runs
/// on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct SystemKeyring {
    service: String,
}

impl Default for SystemKeyring {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemKeyring {
    /// Creates a keyring scoped to [`SERVICE_NAME`].
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Creates a keyring scoped to a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    async fn run<T, F>(&self, key: &str, op: F) -> Result<T, CredentialError>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T, CredentialError> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_owned();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key)?;
            op(entry)
        })
        .await
        .map_err(|e| CredentialError::Worker(e.to_string()))?
    }
}

#[async_trait]
impl KeyringBackend for SystemKeyring {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        debug!(key = %key, "Reading credential from keyring");

        let result = self
            .run(key, |entry| match entry.get_password() {
                Ok(secret) => Ok(Some(secret)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(e.into()),
            })
            .await;

        match &result {
            Ok(Some(_)) => debug!(key = %key, "Credential found"),
            Ok(None) => debug!(key = %key, "Credential not found"),
            Err(e) => warn!(key = %key, error = %e, "Failed to read credential"),
        }
        result
    }

    async fn write(&self, key: &str, secret: &str) -> Result<(), CredentialError> {
        debug!(key = %key, "Writing credential to keyring");

        let secret = secret.to_owned();
        self.run(key, move |entry| entry.set_password(&secret).map_err(Into::into))
            .await
            .inspect_err(|e| warn!(key = %key, error = %e, "Failed to write credential"))
    }

    async fn delete(&self, key: &str) -> Result<(), CredentialError> {
        debug!(key = %key, "Deleting credential from keyring");

        self.run(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        })
        .await
        .inspect_err(|e| warn!(key = %key, error = %e, "Failed to delete credential"))
    }
}

// ============================================================================
// Memory Keyring
// ============================================================================

/// In-process keyring.
#[derive(Debug, Default)]
pub struct MemoryKeyring {
    entries: Mutex<HashMap<String, String>>,
    failure: Option<String>,
}

impl MemoryKeyring {
    /// Creates an empty keyring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a keyring whose every call fails as unavailable.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            entries: Mutex::default(),
            failure: Some(reason.into()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), CredentialError> {
        match &self.failure {
            Some(reason) => Err(CredentialError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KeyringBackend for MemoryKeyring {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, key: &str) -> Result<Option<String>, CredentialError> {
        self.check()?;
        Ok(self.entries().get(key).cloned())
    }

    async fn write(&self, key: &str, secret: &str) -> Result<(), CredentialError> {
        self.check()?;
        self.entries().insert(key.to_owned(), secret.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CredentialError> {
        self.check()?;
        self.entries().remove(key);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_keyring_roundtrip() {
        let keyring = MemoryKeyring::new();

        assert_eq!(keyring.read("chatline:twitch:oauth").await.unwrap(), None);

        keyring.write("chatline:twitch:oauth", "abc").await.unwrap();
        assert_eq!(
            keyring.read("chatline:twitch:oauth").await.unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(keyring.len(), 1);

        keyring.delete("chatline:twitch:oauth").await.unwrap();
        keyring.delete("chatline:twitch:oauth").await.unwrap();
        assert!(keyring.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_keyring_fails_every_call() {
        let keyring = MemoryKeyring::unavailable("no secret service");

        assert!(matches!(
            keyring.read("k").await,
            Err(CredentialError::Unavailable(_))
        ));
        assert!(keyring.write("k", "v").await.is_err());
        assert!(keyring.delete("k").await.is_err());
    }

    #[test]
    fn test_system_keyring_service() {
        assert_eq!(SystemKeyring::new().service, "chatline");
        assert_eq!(SystemKeyring::with_service("other").service, "other");
        assert_eq!(SystemKeyring::new().name(), "system");
    }

    // Actual OS keyring access needs a platform secret service and is not
    // exercised by unit tests.
}
