//! # a3s-veil
//!
//! Sensitive message detection, masking, and at-rest encryption for A3S
//! chat clients.
//!
//! ## Overview
//!
//! Before a chat message leaves the device, `a3s-veil` decides whether it
//! is sensitive, produces a display-safe masked copy, and encrypts the
//! original under a key that never leaves the device. Only the masked text
//! and the ciphertext are meant to be stored remotely; the receiver reveals
//! the original on demand with the shared key.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_veil::{decrypt, EncryptionKey, KeywordSet, PrivacyPipeline};
//!
//! # fn example() -> a3s_veil::Result<()> {
//! let key = EncryptionKey::generate();
//! let pipeline = PrivacyPipeline::default();
//!
//! let result = pipeline.process("Call me at 9876543210", &KeywordSet::builtin(), &key, true)?;
//! assert!(result.is_sensitive);
//! assert_eq!(result.masked, "Call me at ***");
//! assert_eq!(decrypt(&result.encrypted, &key), "Call me at 9876543210");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Architecture
//!
//! - **corpus** — built-in keywords and structural patterns
//! - **KeywordSet** — built-in ∪ custom keywords, one compiled matcher
//! - **classifier** / **masker** — pure detection and redaction
//! - **crypto** — AES-256-GCM with per-message derived keys
//! - **KeyCustodian** — key lifecycle and persisted settings
//! - **PrivacyPipeline** — classify → mask → encrypt
//!
//! Detection is pattern based and therefore imprecise; see [`corpus`].

pub mod classifier;
pub mod corpus;
pub mod crypto;
pub mod custodian;
pub mod error;
pub mod keywords;
pub mod masker;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-export core types
pub use classifier::{classify, detect, is_sensitive, Detection};
pub use corpus::{KeywordCategory, PatternFamily, CORPUS_VERSION, MASK_MARKER};
pub use crypto::{
    decrypt, encrypt, generate_key, is_decryption_failure, try_decrypt, try_encrypt,
    Aes256GcmCipher, DecryptError, EncryptionKey, MessageCipher,
};
pub use custodian::{
    ConfirmationPrompt, CustodianConfig, DestructiveAction, KeyCustodian, PrivacySettings,
    REGENERATE_KEY_WARNING,
};
pub use error::{PrivacyError, Result};
pub use keywords::KeywordSet;
pub use masker::{mask, mask_with};
pub use pipeline::{simulate_attacker_view, EncryptFailurePolicy, PipelineConfig, PrivacyPipeline};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use types::{AttackerView, MessageClassificationResult, MessageMeta, MessageRecord};
