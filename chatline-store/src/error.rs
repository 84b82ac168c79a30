//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Io(_) => true,
            StoreError::Serialization(_) | StoreError::Config(_) => false,
        }
    }
}

// ============================================================================
// Credential Error
// ============================================================================

/// Errors reported by credential requests.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The OS denied access to the keyring.
    #[error("Access denied to keyring")]
    AccessDenied,

    /// No keyring service is available.
    #[error("Keyring unavailable: {0}")]
    Unavailable(String),

    /// Platform-specific failure.
    #[error("Platform error: {0}")]
    Platform(String),

    /// The request was cancelled before it completed.
    #[error("Credential request cancelled")]
    Cancelled,

    /// The worker running the request failed.
    #[error("Credential worker failed: {0}")]
    Worker(String),

    /// Generic error.
    #[error("Keyring error: {0}")]
    Other(String),
}

impl CredentialError {
    /// Returns true if retrying the request might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CredentialError::Unavailable(_) | CredentialError::Worker(_))
    }
}

impl From<keyring::Error> for CredentialError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoStorageAccess(e) => {
                tracing::debug!(error = %e, "Keyring storage not accessible");
                CredentialError::AccessDenied
            }
            keyring::Error::PlatformFailure(e) => CredentialError::Platform(e.to_string()),
            keyring::Error::Ambiguous(_) => {
                CredentialError::Other("Ambiguous credential entry".to_string())
            }
            keyring::Error::NoEntry => CredentialError::Other("No matching entry".to_string()),
            _ => CredentialError::Unavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CredentialError::Unavailable("dbus".into()).is_transient());
        assert!(!CredentialError::AccessDenied.is_transient());
        assert!(!CredentialError::Cancelled.is_transient());

        let io = std::io::Error::other("disk");
        assert!(StoreError::from(io).is_transient());
        assert!(!StoreError::Config("bad".into()).is_transient());
        assert!(CredentialError::Worker("panic".into()).is_transient());
    }

    #[test]
    fn test_keyring_error_mapping() {
        let err = CredentialError::from(keyring::Error::Ambiguous(Vec::new()));
        assert!(matches!(err, CredentialError::Other(_)));

        let err = CredentialError::from(keyring::Error::TooLong("user".into(), 255));
        assert!(matches!(err, CredentialError::Unavailable(_)));
    }
}
