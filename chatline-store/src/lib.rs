// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Chatline Store
//!
//! Persistent state for the Chatline client.
//!
//! This crate provides:
//!
//! - **CredentialStore**: Provider secrets in the OS keyring or a local file
//! - **SettingsStore**: User preferences with persistence
//! - **AppPaths**: Settings locations, including portable installs
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use chatline_store::{AppPaths, CredentialStore, SettingsStore};
//!
//! let paths = AppPaths::detect();
//! let settings = SettingsStore::load(paths.settings_path()).await;
//! let credentials = CredentialStore::open(&paths, &settings.get().await).await;
//!
//! credentials.set("twitch", "oauth_token", "abc123").await?;
//! let token = credentials.get("twitch", "oauth_token").await?;
//!
//! credentials.close().await?;
//! ```

pub mod credentials;
pub mod error;
pub mod persistence;
pub mod settings_store;

pub use credentials::{
    CredentialStore, KeyringBackend, LocalSecretFile, MemoryKeyring, SecretRequest, StorageMode,
    SystemKeyring, format_key,
};
pub use error::{CredentialError, StoreError};
pub use persistence::{AppPaths, default_config_dir, load_json, load_json_or_default, save_json};
pub use settings_store::{LogLevel, Settings, SettingsStore};
#[cfg(test)]
mod persistence_tests;
