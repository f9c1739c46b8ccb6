//! Message encryption for sensitive text
//!
//! Each call derives a fresh AES-256-GCM key from the caller's key text and
//! a random salt (HKDF-SHA256), so a blob carries everything needed to
//! decrypt it except the key itself:
//!
//! ```text
//! base64( version:1 | salt:16 | nonce:12 | ciphertext+tag )
//! ```
//!
//! There is no default key. Key material always comes from the caller,
//! normally the [`KeyCustodian`](crate::custodian::KeyCustodian).

use crate::error::{PrivacyError, Result};
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hkdf::Hkdf;
use sha2::Sha256;
use thiserror::Error;

const BLOB_VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + SALT_LEN + NONCE_LEN;
const HKDF_INFO: &[u8] = b"a3s-veil message key v1";

/// Symmetric key text held by the custodian
///
/// Generated keys are 32 random bytes, hex encoded. Any non-empty string
/// is accepted so keys persisted by older installs keep working.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey(String);

impl EncryptionKey {
    /// Wrap existing key text; rejects the empty string
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(PrivacyError::InvalidKey("key must not be empty".to_string()));
        }
        Ok(Self(key))
    }

    /// Generate a new random 256-bit key
    pub fn generate() -> Self {
        Self(hex::encode(Aes256Gcm::generate_key(&mut OsRng)))
    }

    /// Key text, for persisting
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Why a blob could not be decrypted
///
/// The display text of each variant is the sentinel shown inline in place
/// of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecryptError {
    /// Empty or blank blob
    #[error("[Decryption failed: Invalid input]")]
    InvalidInput,

    /// Not base64, unknown version, or truncated
    #[error("[Decryption failed: Corrupted or invalid encrypted data]")]
    Malformed,

    /// Authentication failed (wrong key or tampered blob) or the plaintext
    /// is not UTF-8
    #[error("[Decryption failed: Invalid key or corrupted data]")]
    Failed,
}

impl DecryptError {
    /// Sentinel text shown in place of the plaintext
    pub fn sentinel(self) -> &'static str {
        match self {
            Self::InvalidInput => "[Decryption failed: Invalid input]",
            Self::Malformed => "[Decryption failed: Corrupted or invalid encrypted data]",
            Self::Failed => "[Decryption failed: Invalid key or corrupted data]",
        }
    }
}

/// Check whether a string returned by [`decrypt`] is a failure sentinel
pub fn is_decryption_failure(text: &str) -> bool {
    [
        DecryptError::InvalidInput,
        DecryptError::Malformed,
        DecryptError::Failed,
    ]
    .into_iter()
    .any(|e| e.sentinel() == text)
}

/// Symmetric cipher used by the pipeline
pub trait MessageCipher: Send + Sync {
    /// Encrypt UTF-8 text into a self-contained blob
    fn seal(&self, plaintext: &str, key: &EncryptionKey) -> Result<String>;

    /// Decrypt a blob produced by [`seal`](Self::seal)
    fn open(&self, blob: &str, key: &EncryptionKey) -> std::result::Result<String, DecryptError>;
}

/// AES-256-GCM with a per-message HKDF-SHA256 derived key
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256GcmCipher;

impl Aes256GcmCipher {
    fn derive(key: &EncryptionKey, salt: &[u8]) -> Result<Aes256Gcm> {
        let hk = Hkdf::<Sha256>::new(Some(salt), key.as_str().as_bytes());
        let mut okm = [0u8; 32];
        hk.expand(HKDF_INFO, &mut okm)
            .map_err(|e| PrivacyError::Encryption(format!("Key derivation failed: {}", e)))?;
        Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&okm)))
    }
}

impl MessageCipher for Aes256GcmCipher {
    fn seal(&self, plaintext: &str, key: &EncryptionKey) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let cipher = Self::derive(key, &salt)?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| PrivacyError::Encryption(e.to_string()))?;

        let mut blob = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        blob.push(BLOB_VERSION);
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(blob))
    }

    fn open(&self, blob: &str, key: &EncryptionKey) -> std::result::Result<String, DecryptError> {
        let blob = blob.trim();
        if blob.is_empty() {
            return Err(DecryptError::InvalidInput);
        }

        let bytes = BASE64.decode(blob).map_err(|_| DecryptError::Malformed)?;
        if bytes.len() < HEADER_LEN + TAG_LEN || bytes[0] != BLOB_VERSION {
            return Err(DecryptError::Malformed);
        }

        let (salt, rest) = bytes[1..].split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let cipher = Self::derive(key, salt).map_err(|_| DecryptError::Failed)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| DecryptError::Failed)?;

        String::from_utf8(plaintext).map_err(|_| DecryptError::Failed)
    }
}

/// Generate a new random encryption key
pub fn generate_key() -> EncryptionKey {
    EncryptionKey::generate()
}

/// Encrypt `plaintext`, surfacing failures
pub fn try_encrypt(plaintext: &str, key: &EncryptionKey) -> Result<String> {
    Aes256GcmCipher.seal(plaintext, key)
}

/// Encrypt `plaintext`, returning it unchanged if encryption fails
///
/// The fallback keeps a send path alive at the cost of confidentiality.
/// Prefer [`try_encrypt`], or the pipeline's default fail-closed policy,
/// wherever the caller can refuse to send instead.
pub fn encrypt(plaintext: &str, key: &EncryptionKey) -> String {
    match try_encrypt(plaintext, key) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::error!(error = %e, "Encryption failed, passing plaintext through");
            plaintext.to_string()
        }
    }
}

/// Decrypt a blob, surfacing the failure kind
pub fn try_decrypt(blob: &str, key: &EncryptionKey) -> std::result::Result<String, DecryptError> {
    Aes256GcmCipher.open(blob, key)
}

/// Decrypt a blob; failures come back as a sentinel string, never an error
pub fn decrypt(blob: &str, key: &EncryptionKey) -> String {
    match try_decrypt(blob, key) {
        Ok(plaintext) => plaintext,
        Err(e) => {
            tracing::warn!(reason = ?e, "Decryption failed");
            e.sentinel().to_string()
        }
    }
}
