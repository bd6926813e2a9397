//! AES-256-GCM conversation cipher.
//!
//! Implements the `ConversationCipher` port over the envelope format
//! `nonce (12) || ciphertext+tag`. GCM's authentication tag makes
//! decryption fail outright on tampered or mismatched input instead of
//! returning garbage.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use auron_application::ports::ConversationCipher;
use auron_domain::{ConversationEnvelope, CryptoError, KEY_LEN, NONCE_LEN};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Key-derivation salt. Must match the backend's user-key derivation.
pub const USER_KEY_SALT: &[u8] = b"combryth-user-encryption-v1";

/// HKDF info string binding derived keys to conversation storage.
const KEY_CONTEXT: &[u8] = b"conversation-storage";

/// A 256-bit conversation key.
#[derive(Clone)]
pub struct ConversationKey([u8; KEY_LEN]);

impl ConversationKey {
    /// Decodes a key delivered out-of-band as base64.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the encoding is invalid or
    /// the decoded material is not exactly [`KEY_LEN`] bytes.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidKey(format!("base64: {e}")))?;

        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|rejected: Vec<u8>| {
            CryptoError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                rejected.len()
            ))
        })?;

        Ok(Self(key))
    }

    /// Derives the user-specific key from the user id.
    ///
    /// HKDF-SHA-256 under [`USER_KEY_SALT`]; deterministic, so client and
    /// backend derive the same key from the same id.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn derive(user_id: &str) -> Self {
        let hkdf = Hkdf::<Sha256>::new(Some(USER_KEY_SALT), user_id.as_bytes());
        let mut key = [0u8; KEY_LEN];
        hkdf.expand(KEY_CONTEXT, &mut key)
            .expect("32 bytes is a valid HKDF-SHA-256 output length");
        Self(key)
    }

    /// Encodes the key as base64 for out-of-band transport.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConversationKey(..)")
    }
}

/// AES-256-GCM implementation of the conversation cipher port.
pub struct EnvelopeCipher {
    cipher: Aes256Gcm,
}

impl EnvelopeCipher {
    /// Creates a cipher holding the given key.
    #[must_use]
    pub fn new(key: &ConversationKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }
}

impl ConversationCipher for EnvelopeCipher {
    fn seal(&self, value: &serde_json::Value) -> Result<Vec<u8>, CryptoError> {
        let plaintext = serde_json::to_vec(value)
            .map_err(|e| CryptoError::EncryptionFailed(format!("serialize: {e}")))?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| CryptoError::EncryptionFailed("AES-GCM encryption failed".to_string()))?;

        Ok(ConversationEnvelope::new(nonce, ciphertext).into_bytes())
    }

    fn open(&self, buffer: &[u8]) -> Result<serde_json::Value, CryptoError> {
        // Envelope validation happens before any cryptographic work.
        let envelope = ConversationEnvelope::parse(buffer)?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(envelope.nonce()), envelope.ciphertext())
            .map_err(|_| {
                CryptoError::DecryptionFailed(
                    "authentication failed: wrong key or tampered data".to_string(),
                )
            })?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| CryptoError::DecryptionFailed(format!("plaintext is not valid JSON: {e}")))
    }
}

/// Hex-encoded SHA-256 of the user id, used for per-user storage paths.
#[must_use]
pub fn user_storage_hash(user_id: &str) -> String {
    hex::encode(Sha256::digest(user_id.as_bytes()))
}
