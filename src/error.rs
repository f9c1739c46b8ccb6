//! Error types for a3s-veil

use thiserror::Error;

/// Errors that can occur while protecting or persisting messages
///
/// Classification and masking never fail; only key handling, encryption
/// and storage surface errors.
#[derive(Debug, Error)]
pub enum PrivacyError {
    /// Key material missing or unusable
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    /// Encryption failure
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Local key-value storage failure
    #[error("Storage error for '{key}': {reason}")]
    Storage {
        key: String,
        reason: String,
    },

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A keyword or pattern could not be compiled into a matcher
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl PrivacyError {
    pub(crate) fn storage(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Storage {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for privacy operations
pub type Result<T> = std::result::Result<T, PrivacyError>;
