//! Encryption key and keyword custody
//!
//! `KeyCustodian` owns the device's single active encryption key, the
//! user's custom keywords, and the encryption on/off flag. All three are
//! persisted through a [`KeyValueStore`] under fixed names so upgrades
//! keep them.
//!
//! The key is generated once, on first run, and reused unconditionally
//! afterwards. Replacing it makes every earlier ciphertext permanently
//! unreadable, so [`KeyCustodian::regenerate_key`] only runs after an
//! explicit confirmation.

use crate::corpus::CORPUS_VERSION;
use crate::crypto::{decrypt, EncryptionKey};
use crate::error::Result;
use crate::keywords::KeywordSet;
use crate::pipeline::{PipelineConfig, PrivacyPipeline};
use crate::store::KeyValueStore;
use crate::types::MessageClassificationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage name of the encryption key
pub const KEY_STORAGE_NAME: &str = "encryption_key";

/// Storage name of the custom keyword JSON array
pub const KEYWORDS_STORAGE_NAME: &str = "custom_keywords";

/// Storage name of the encryption flag
pub const ENCRYPTION_FLAG_STORAGE_NAME: &str = "encryption_enabled";

/// A destructive action the user must confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestructiveAction {
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
    pub cancel_label: &'static str,
}

/// Warning shown before the encryption key is replaced
pub const REGENERATE_KEY_WARNING: DestructiveAction = DestructiveAction {
    title: "Regenerate Encryption Key?",
    message: "This will make ALL your previous encrypted messages unreadable. \
              This action cannot be undone.\n\n\
              Only do this if you want to start fresh with a new key.",
    confirm_label: "Regenerate (I Understand)",
    cancel_label: "Cancel",
};

/// Asks the user to confirm a destructive action
///
/// Implementations show `action` and resolve to `true` only on an explicit
/// confirmation; dismissing the prompt must resolve to `false`.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, action: &DestructiveAction) -> bool;
}

/// Custodian configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodianConfig {
    /// Encryption flag used when none has been persisted yet
    #[serde(default = "default_encryption_enabled")]
    pub default_encryption_enabled: bool,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

fn default_encryption_enabled() -> bool {
    true
}

impl Default for CustodianConfig {
    fn default() -> Self {
        Self {
            default_encryption_enabled: true,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Snapshot of the user-facing privacy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    /// Effective keywords, built-in first
    pub keywords: Vec<String>,
    pub custom_keywords: Vec<String>,
    pub encryption_enabled: bool,
    pub corpus_version: u32,
}

struct CustodianState {
    key: EncryptionKey,
    keywords: KeywordSet,
    encryption_enabled: bool,
}

/// Owner of the active key, keyword list and encryption flag
///
/// Mutations persist first and update memory only once the write
/// succeeded, so a `false` return means nothing changed.
pub struct KeyCustodian {
    store: Arc<dyn KeyValueStore>,
    pipeline: PrivacyPipeline,
    /// Held for reading across a whole `protect`; regeneration takes it
    /// for writing across persist + swap.
    state: RwLock<CustodianState>,
}

impl KeyCustodian {
    /// Load custodian state, generating the key on first run
    ///
    /// Fails only if the stored key cannot be read or a first-run key
    /// cannot be persisted. Unreadable keywords or flag fall back to
    /// defaults.
    pub async fn load(store: Arc<dyn KeyValueStore>, config: CustodianConfig) -> Result<Self> {
        let key = match store.get(KEY_STORAGE_NAME).await? {
            Some(stored) if !stored.is_empty() => {
                tracing::debug!(key_name = KEY_STORAGE_NAME, "Encryption key loaded from storage");
                EncryptionKey::new(stored)?
            }
            _ => {
                let key = EncryptionKey::generate();
                store.set(KEY_STORAGE_NAME, key.as_str()).await?;
                tracing::info!(key_name = KEY_STORAGE_NAME, "New encryption key generated (first run)");
                key
            }
        };

        let keywords = match load_custom_keywords(store.as_ref()).await {
            Ok(custom) => KeywordSet::with_custom(custom),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load custom keywords, using defaults");
                KeywordSet::builtin()
            }
        };

        let encryption_enabled = match store.get(ENCRYPTION_FLAG_STORAGE_NAME).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid encryption flag, using default");
                config.default_encryption_enabled
            }),
            Ok(None) => config.default_encryption_enabled,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load encryption flag, using default");
                config.default_encryption_enabled
            }
        };

        tracing::debug!(
            custom_keywords = keywords.custom().len(),
            encryption_enabled,
            "Custodian loaded"
        );

        Ok(Self {
            store,
            pipeline: PrivacyPipeline::new(config.pipeline),
            state: RwLock::new(CustodianState {
                key,
                keywords,
                encryption_enabled,
            }),
        })
    }

    /// The active encryption key
    pub async fn key(&self) -> EncryptionKey {
        self.state.read().await.key.clone()
    }

    /// The effective keyword set
    pub async fn keywords(&self) -> KeywordSet {
        self.state.read().await.keywords.clone()
    }

    /// Custom keywords only
    pub async fn custom_keywords(&self) -> Vec<String> {
        self.state.read().await.keywords.custom().to_vec()
    }

    /// Whether sensitive messages are encrypted
    pub async fn encryption_enabled(&self) -> bool {
        self.state.read().await.encryption_enabled
    }

    /// Snapshot of the current settings
    pub async fn settings(&self) -> PrivacySettings {
        let state = self.state.read().await;
        PrivacySettings {
            keywords: state.keywords.terms().map(str::to_string).collect(),
            custom_keywords: state.keywords.custom().to_vec(),
            encryption_enabled: state.encryption_enabled,
            corpus_version: CORPUS_VERSION,
        }
    }

    /// Add a custom keyword
    ///
    /// Returns `false` if the normalized term is empty, already present,
    /// or could not be persisted.
    pub async fn add_keyword(&self, term: &str) -> bool {
        let mut state = self.state.write().await;
        let Some(updated) = state.keywords.with_added(term) else {
            return false;
        };
        if !self.persist_keywords(&updated).await {
            return false;
        }
        state.keywords = updated;
        tracing::info!(count = state.keywords.custom().len(), "Custom keyword added");
        true
    }

    /// Remove a custom keyword
    ///
    /// Built-in terms cannot be removed; returns `false` for them, for
    /// unknown terms, and on persistence failure.
    pub async fn remove_keyword(&self, term: &str) -> bool {
        let mut state = self.state.write().await;
        let Some(updated) = state.keywords.with_removed(term) else {
            return false;
        };
        if !self.persist_keywords(&updated).await {
            return false;
        }
        state.keywords = updated;
        tracing::info!(count = state.keywords.custom().len(), "Custom keyword removed");
        true
    }

    /// Drop every custom keyword, leaving the built-in corpus
    pub async fn reset_keywords(&self) -> bool {
        let mut state = self.state.write().await;
        if let Err(e) = self.store.remove(KEYWORDS_STORAGE_NAME).await {
            tracing::error!(error = %e, "Failed to reset custom keywords");
            return false;
        }
        state.keywords = KeywordSet::builtin();
        tracing::info!("Keywords reset to defaults");
        true
    }

    /// Turn encryption of sensitive messages on or off
    ///
    /// Existing ciphertexts are untouched.
    pub async fn toggle_encryption(&self, enabled: bool) -> bool {
        let mut state = self.state.write().await;
        let raw = if enabled { "true" } else { "false" };
        if let Err(e) = self.store.set(ENCRYPTION_FLAG_STORAGE_NAME, raw).await {
            tracing::error!(error = %e, "Failed to persist encryption flag");
            return false;
        }
        state.encryption_enabled = enabled;
        tracing::info!(enabled, "Encryption toggled");
        true
    }

    /// Replace the encryption key after explicit confirmation
    ///
    /// Every message encrypted under the old key becomes permanently
    /// unreadable. Returns `false` without side effects if the prompt is
    /// declined or the new key cannot be persisted.
    pub async fn regenerate_key(&self, prompt: &dyn ConfirmationPrompt) -> bool {
        if !prompt.confirm(&REGENERATE_KEY_WARNING).await {
            tracing::info!("Key regeneration declined");
            return false;
        }

        let mut state = self.state.write().await;
        let key = EncryptionKey::generate();
        if let Err(e) = self.store.set(KEY_STORAGE_NAME, key.as_str()).await {
            tracing::error!(error = %e, "Failed to persist regenerated key, keeping old key");
            return false;
        }
        state.key = key;
        tracing::info!(
            key_name = KEY_STORAGE_NAME,
            "Encryption key regenerated, older messages can no longer be decrypted"
        );
        true
    }

    /// Run an outbound message through the pipeline with the current
    /// keywords, key and encryption flag
    pub async fn protect(&self, text: &str) -> Result<MessageClassificationResult> {
        let state = self.state.read().await;
        self.pipeline
            .process(text, &state.keywords, &state.key, state.encryption_enabled)
    }

    /// Decrypt a blob with the active key, returning a sentinel on failure
    pub async fn reveal(&self, blob: &str) -> String {
        let state = self.state.read().await;
        decrypt(blob, &state.key)
    }

    async fn persist_keywords(&self, keywords: &KeywordSet) -> bool {
        let json = match serde_json::to_string(keywords.custom()) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize custom keywords");
                return false;
            }
        };
        match self.store.set(KEYWORDS_STORAGE_NAME, &json).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist custom keywords");
                false
            }
        }
    }
}

async fn load_custom_keywords(store: &dyn KeyValueStore) -> Result<Vec<String>> {
    match store.get(KEYWORDS_STORAGE_NAME).await? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}
