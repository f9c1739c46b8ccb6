//! Message types produced by the privacy pipeline
//!
//! Types that cross the device boundary use camelCase JSON serialization
//! to line up with the chat document fields.

use crate::crypto::{decrypt, EncryptionKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of running one outbound message through the pipeline
///
/// `original` stays on the sender's device. Only `masked` and `encrypted`
/// are safe to transmit; build a [`MessageRecord`] for that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageClassificationResult {
    /// Text as typed by the sender
    pub original: String,

    /// Display-safe copy with sensitive spans replaced
    pub masked: String,

    /// Whether any sensitivity check fired
    pub is_sensitive: bool,

    /// Encrypted original, empty when not sensitive or encryption is off
    pub encrypted: String,

    /// Whether the receiver must decrypt to see the original
    pub needs_decryption: bool,
}

/// Sender, receiver and time of a message, for the attacker view
#[derive(Debug, Clone, Default)]
pub struct MessageMeta {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl MessageMeta {
    /// Meta with sender and receiver, stamped now
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            receiver: Some(receiver.into()),
            timestamp: Some(Utc::now()),
        }
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// What a passive network observer or a compromised server can read
///
/// Deliberately has no field for the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackerView {
    pub sender: String,
    pub receiver: String,
    pub masked_text: String,
    /// Ciphertext, empty when the message was not encrypted
    pub encrypted_original: String,
    pub timestamp: DateTime<Utc>,
    pub is_sensitive: bool,
}

/// Message fields the privacy core contributes to a chat document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Unique message identifier (msg-<uuid>)
    pub id: String,

    /// Masked text, what every reader sees by default
    pub text: String,

    /// Sender-local copy of the original; receivers must not rely on it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,

    pub is_sensitive: bool,

    /// Opaque ciphertext of the original
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub encrypted_text: String,

    pub needs_decryption: bool,

    /// Unix timestamp in milliseconds
    pub created_at: u64,
}

impl MessageRecord {
    /// Record safe for shared storage: never carries the original
    pub fn outbound(result: &MessageClassificationResult) -> Self {
        Self {
            id: format!("msg-{}", uuid::Uuid::new_v4()),
            text: result.masked.clone(),
            original_text: None,
            is_sensitive: result.is_sensitive,
            encrypted_text: result.encrypted.clone(),
            needs_decryption: result.needs_decryption,
            created_at: now_millis(),
        }
    }

    /// Record for the sender's own device, keeping the original
    pub fn sender_local(result: &MessageClassificationResult) -> Self {
        Self {
            original_text: Some(result.original.clone()),
            ..Self::outbound(result)
        }
    }

    /// Text to show when the reader asks to reveal the message
    ///
    /// Decrypts with `key` when the record is encrypted; otherwise returns
    /// the stored text. Failures come back as a decryption sentinel.
    pub fn reveal(&self, key: &EncryptionKey) -> String {
        if self.needs_decryption && !self.encrypted_text.is_empty() {
            decrypt(&self.encrypted_text, key)
        } else {
            self.text.clone()
        }
    }
}

/// Current time as Unix milliseconds
fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
