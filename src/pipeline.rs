//! Outbound message privacy pipeline
//!
//! classify → mask → encrypt when sensitive. The keyword set and key are
//! explicit parameters; the pipeline holds no user state of its own.

use crate::classifier::detect;
use crate::crypto::{Aes256GcmCipher, EncryptionKey, MessageCipher};
use crate::error::Result;
use crate::keywords::KeywordSet;
use crate::masker::mask_with;
use crate::types::{AttackerView, MessageClassificationResult, MessageMeta};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// What to do when encrypting a sensitive message fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptFailurePolicy {
    /// Return the error so the caller can refuse to send
    #[default]
    Refuse,
    /// Send masked text only; `encrypted` stays empty and
    /// `needs_decryption` false, so the original is unrecoverable
    SendMaskedOnly,
}

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub on_encrypt_failure: EncryptFailurePolicy,
}

/// Classifies, masks and encrypts outbound messages
pub struct PrivacyPipeline {
    config: PipelineConfig,
    cipher: Box<dyn MessageCipher>,
}

impl Default for PrivacyPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl std::fmt::Debug for PrivacyPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivacyPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PrivacyPipeline {
    /// Create a pipeline using AES-256-GCM
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_cipher(config, Aes256GcmCipher)
    }

    /// Create a pipeline with a custom cipher
    pub fn with_cipher(config: PipelineConfig, cipher: impl MessageCipher + 'static) -> Self {
        Self {
            config,
            cipher: Box::new(cipher),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one outbound message
    ///
    /// The same `keywords` drive classification and masking. The masked
    /// copy is always computed; for non-sensitive text it equals the input.
    pub fn process(
        &self,
        text: &str,
        keywords: &KeywordSet,
        key: &EncryptionKey,
        encryption_enabled: bool,
    ) -> Result<MessageClassificationResult> {
        let detection = detect(text, keywords);
        let is_sensitive = detection.is_some();
        let masked = mask_with(text, keywords);

        let mut result = MessageClassificationResult {
            original: text.to_string(),
            masked,
            is_sensitive,
            encrypted: String::new(),
            needs_decryption: false,
        };

        if let Some(detection) = detection {
            tracing::debug!(rule = detection.rule_name(), "Sensitive message detected");

            if encryption_enabled {
                match self.cipher.seal(text, key) {
                    Ok(blob) => {
                        result.encrypted = blob;
                        result.needs_decryption = true;
                    }
                    Err(e) => match self.config.on_encrypt_failure {
                        EncryptFailurePolicy::Refuse => {
                            tracing::error!(error = %e, "Encryption failed, refusing to send");
                            return Err(e);
                        }
                        EncryptFailurePolicy::SendMaskedOnly => {
                            tracing::error!(error = %e, "Encryption failed, sending masked text only");
                        }
                    },
                }
            }
        }

        Ok(result)
    }

    /// Process with the built-in corpus plus `custom_keywords`
    pub fn process_with_custom<S: AsRef<str>>(
        &self,
        text: &str,
        custom_keywords: &[S],
        key: &EncryptionKey,
        encryption_enabled: bool,
    ) -> Result<MessageClassificationResult> {
        self.process(
            text,
            &KeywordSet::with_custom(custom_keywords),
            key,
            encryption_enabled,
        )
    }
}

/// Project a processed message onto what an observer without the key sees
///
/// Missing sender/receiver become `"unknown"`, a missing timestamp is now.
pub fn simulate_attacker_view(result: &MessageClassificationResult, meta: &MessageMeta) -> AttackerView {
    AttackerView {
        sender: meta.sender.clone().unwrap_or_else(|| "unknown".to_string()),
        receiver: meta.receiver.clone().unwrap_or_else(|| "unknown".to_string()),
        masked_text: result.masked.clone(),
        encrypted_original: result.encrypted.clone(),
        timestamp: meta.timestamp.unwrap_or_else(Utc::now),
        is_sensitive: result.is_sensitive,
    }
}
