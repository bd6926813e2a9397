//! Encrypted conversation envelope format.
//!
//! A conversation blob is a single contiguous byte buffer packed as
//! `nonce (12 bytes) || ciphertext+tag`. The symmetric key (32 raw bytes)
//! travels separately, base64-encoded, delivered out-of-band by the
//! backend.

use crate::error::CryptoError;

/// Nonce length in bytes. Always the first 12 bytes of a blob.
pub const NONCE_LEN: usize = 12;

/// AES-256 key length in raw bytes.
pub const KEY_LEN: usize = 32;

/// GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// A parsed conversation blob: nonce plus ciphertext (tag included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEnvelope {
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl ConversationEnvelope {
    /// Builds an envelope from its parts.
    #[must_use]
    pub const fn new(nonce: [u8; NONCE_LEN], ciphertext: Vec<u8>) -> Self {
        Self { nonce, ciphertext }
    }

    /// Splits a packed buffer into nonce and ciphertext.
    ///
    /// The nonce is always exactly the first [`NONCE_LEN`] bytes; any
    /// shorter buffer is malformed input, rejected before any
    /// cryptographic work.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] if `buffer` is shorter
    /// than [`NONCE_LEN`].
    pub fn parse(buffer: &[u8]) -> Result<Self, CryptoError> {
        if buffer.len() < NONCE_LEN {
            return Err(CryptoError::MalformedEnvelope {
                actual: buffer.len(),
            });
        }

        let (nonce_bytes, ciphertext) = buffer.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// The envelope nonce.
    #[must_use]
    pub const fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// The ciphertext, authentication tag included.
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Packs the envelope back into a contiguous buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        let mut packed = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        packed.extend_from_slice(&self.nonce);
        packed.extend_from_slice(&self.ciphertext);
        packed
    }
}
