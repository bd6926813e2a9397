//! Application error types

use auron_domain::{AuthError, CryptoError, DomainError};
use thiserror::Error;

use crate::ports::TransportError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// An authentication failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The HTTP transport failed before a response was produced.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A conversation envelope could not be sealed or opened.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The backend answered with a non-success status.
    #[error("{endpoint} request failed with status {status}")]
    Api {
        /// Logical endpoint name.
        endpoint: &'static str,
        /// HTTP status returned.
        status: u16,
    },

    /// A payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
