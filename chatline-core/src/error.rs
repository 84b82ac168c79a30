//! Core error types for Chatline.

use thiserror::Error;

/// Core error type for Chatline operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Channel not found.
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
