//! Conversation cipher port.

use auron_domain::CryptoError;

/// Port for sealing and opening encrypted conversation payloads.
///
/// Implementations hold the symmetric key; payloads are JSON values packed
/// as `nonce || ciphertext+tag` buffers.
pub trait ConversationCipher: Send + Sync {
    /// Encrypts a JSON value into a packed envelope buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or encryption fails.
    fn seal(&self, value: &serde_json::Value) -> Result<Vec<u8>, CryptoError>;

    /// Decrypts a packed envelope buffer into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] for buffers too short to
    /// hold a nonce, and [`CryptoError::DecryptionFailed`] when the
    /// authentication tag or the plaintext JSON is invalid. A failed open
    /// never yields partial plaintext.
    fn open(&self, buffer: &[u8]) -> Result<serde_json::Value, CryptoError>;
}
