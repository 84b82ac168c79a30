//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, JSON persistence, and settings round-trip.

use std::collections::BTreeMap;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::persistence::{ensure_dir, load_json, load_json_or_default, save_json};
use crate::settings_store::{LogLevel, Settings};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_and_load_json_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("test.json");

    let mut settings = Settings::default();
    settings.completion_max_entries = 25;

    save_json(&file_path, &settings).await.unwrap();
    let loaded: Settings = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("credentials.json");

    let data = serde_json::json!({"chatline:twitch:oauth": "abc"});

    let result = save_json(&nested_path, &data).await;
    assert!(result.is_ok());
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/settings.json");

    let result: Result<Settings, _> = load_json(&file_path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_load_or_default_on_garbage() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("garbage.json");
    tokio::fs::write(&file_path, "\u{0}\u{1}not json").await.unwrap();

    let loaded: BTreeMap<String, String> = load_json_or_default(&file_path).await;
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("Settings");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

// ============================================================================
// Backward Compatibility Tests
// ============================================================================

#[tokio::test]
async fn test_load_minimal_json_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("minimal.json");

    tokio::fs::write(&file_path, "{}").await.unwrap();

    let loaded: Settings = load_json(&file_path).await.unwrap();
    assert!(loaded.use_keyring);
    assert_eq!(loaded.completion_max_entries, 200);
}

#[tokio::test]
async fn test_load_json_with_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("extra_fields.json");

    let json = r#"{
        "use_keyring": false,
        "log_level": "trace",
        "unknown_field": 12345,
        "nested_unknown": {"key": "value"}
    }"#;
    tokio::fs::write(&file_path, json).await.unwrap();

    let loaded: Settings = load_json(&file_path).await.unwrap();
    assert!(!loaded.use_keyring);
    assert_eq!(loaded.log_level, LogLevel::Trace);
}

#[tokio::test]
async fn test_atomic_write() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("credentials.json");

    save_json(&file_path, &serde_json::json!({"a": "1"})).await.unwrap();
    save_json(&file_path, &serde_json::json!({"a": "2"})).await.unwrap();

    let temp_path = file_path.with_extension("json.tmp");
    assert!(!temp_path.exists());

    let loaded: BTreeMap<String, String> = load_json(&file_path).await.unwrap();
    assert_eq!(loaded["a"], "2");
}

#[tokio::test]
async fn test_unicode_secrets() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("unicode.json");

    let mut secrets = BTreeMap::new();
    secrets.insert("chatline:twitch:ユーザー".to_string(), "🚀 pässwörd 中文".to_string());

    save_json(&file_path, &secrets).await.unwrap();
    let loaded: BTreeMap<String, String> = load_json(&file_path).await.unwrap();

    assert_eq!(loaded, secrets);
}
