//! File persistence helpers.
//!
//! Handles application paths (including portable installs) and loading and
//! saving JSON documents to disk with proper security.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

/// Marker file that switches an installation into portable mode.
const PORTABLE_MARKER: &str = "portable";

/// Settings directory name inside a portable installation.
const PORTABLE_SETTINGS_DIR: &str = "Settings";

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/Chatline`
/// - Linux: `~/.config/chatline`
/// - Windows: `%APPDATA%\chatline`
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join("Chatline"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .map(|c| c.join("chatline"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

// ============================================================================
// Application Paths
// ============================================================================

/// Where Chatline keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    settings_dir: PathBuf,
    portable: bool,
}

impl AppPaths {
    /// Detects the paths for the running executable.
    ///
    /// A `portable` file next to the executable keeps every file, secrets
    /// included, inside the installation directory.
    pub fn detect() -> Self {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));

        match exe_dir {
            Some(dir) if dir.join(PORTABLE_MARKER).exists() => {
                debug!(path = %dir.display(), "Portable installation detected");
                Self::portable(dir)
            }
            _ => Self::installed(default_config_dir()),
        }
    }

    /// Paths for a regular installation using `settings_dir`.
    pub fn installed(settings_dir: impl Into<PathBuf>) -> Self {
        Self {
            settings_dir: settings_dir.into(),
            portable: false,
        }
    }

    /// Paths for a portable installation rooted at `root`.
    pub fn portable(root: impl AsRef<Path>) -> Self {
        Self {
            settings_dir: root.as_ref().join(PORTABLE_SETTINGS_DIR),
            portable: true,
        }
    }

    /// Returns true when running from a portable installation.
    pub fn is_portable(&self) -> bool {
        self.portable
    }

    /// The settings directory.
    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// The settings file.
    pub fn settings_path(&self) -> PathBuf {
        self.settings_dir.join("settings.json")
    }

    /// The local (unencrypted) credentials file.
    pub fn credentials_path(&self) -> PathBuf {
        self.settings_dir.join("credentials.json")
    }
}

// ============================================================================
// Security: File Permissions
// ============================================================================

/// Sets restrictive file permissions (0o600) on Unix systems.
///
/// The credentials file holds plain-text secrets and must only be
/// readable by the owner.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0600", "Set restrictive permissions");
    Ok(())
}

/// Sets restrictive directory permissions (0o700) on Unix systems.
#[cfg(unix)]
async fn set_restrictive_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o700);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = "0700", "Set restrictive directory permissions");
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

/// No-op for non-Unix systems.
#[cfg(not(unix))]
async fn set_restrictive_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// File Operations
// ============================================================================

/// Saves data to a JSON file with secure permissions.
///
/// Creates the parent directory if it doesn't exist and writes atomically
/// (temp file + rename), so a crash mid-write leaves the previous file
/// intact.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let json = serde_json::to_string_pretty(data)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    set_restrictive_permissions(&temp_path).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), "JSON file saved securely");
    Ok(())
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    debug!(path = %path.display(), "JSON file loaded");
    Ok(data)
}

/// Loads data from a JSON file, returning default if missing or unreadable.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !matches!(&e, StoreError::Io(io) if io.kind() == std::io::ErrorKind::NotFound) {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

/// Ensures a directory exists with secure permissions.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    debug!(path = %path.display(), "Creating directory");
    tokio::fs::create_dir_all(path).await?;
    set_restrictive_dir_permissions(path).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_dir() {
        let path = default_config_dir();
        assert!(!path.as_os_str().is_empty());
    }

    #[test]
    fn test_portable_paths() {
        let paths = AppPaths::portable("/opt/chatline");
        assert!(paths.is_portable());
        assert_eq!(paths.settings_dir(), Path::new("/opt/chatline/Settings"));
        assert!(paths.credentials_path().ends_with("Settings/credentials.json"));
    }

    #[test]
    fn test_installed_paths() {
        let paths = AppPaths::installed("/home/me/.config/chatline");
        assert!(!paths.is_portable());
        assert!(paths.settings_path().ends_with("settings.json"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.json");

        tokio::fs::write(&test_file, "{}").await.unwrap();
        set_restrictive_permissions(&test_file).await.unwrap();

        let metadata = tokio::fs::metadata(&test_file).await.unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "File should have 0600 permissions");
    }
}
