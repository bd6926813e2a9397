//! Domain error types

use thiserror::Error;

use crate::conversation::NONCE_LEN;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A configuration value violates its constraints.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised by the conversation encryption layer.
///
/// These are always surfaced to the caller: a failed decrypt must never
/// return partial or zeroed plaintext.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The envelope buffer is too short to contain a nonce.
    #[error("malformed envelope: {actual} bytes, expected at least {NONCE_LEN}")]
    MalformedEnvelope {
        /// Length of the rejected buffer.
        actual: usize,
    },

    /// The key material could not be decoded or has the wrong length.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Authentication, decryption, or plaintext decoding failed.
    ///
    /// Tag verification failures and post-decrypt JSON parse failures share
    /// this variant and are distinguished by message only.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}
