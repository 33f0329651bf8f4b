use std::io;

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::headers::HeaderError;

/// Unified envelope error.
/// - Every variant aborts the current stream; nothing is retried internally.
/// - Module-level errors (`HeaderError`, `CryptoError`) fold into these via `From`,
///   so `?` works across the engine.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Unknown method name at encrypt time or unknown method code in a header.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Truncated or size-mismatched header fields.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Caller-supplied input rejected (empty salt, bad public key, bad config, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Hybrid session key could not be recovered. Deliberately carries no detail.
    #[error("key unwrap failed")]
    KeyUnwrapFailure,

    /// GCM tag mismatch at finalize. Any plaintext already emitted must be discarded.
    #[error("authentication failed: ciphertext or credential is wrong")]
    AuthenticationFailure,

    /// The source does not support the random access this format needs.
    #[error("seek failed: {0}")]
    SeekFailure(#[source] io::Error),

    /// Plain I/O failure while reading the source or writing the sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<HeaderError> for EnvelopeError {
    fn from(e: HeaderError) -> Self {
        match e {
            HeaderError::UnknownMethod { .. } | HeaderError::UnknownMethodName { .. } =>
                EnvelopeError::UnsupportedMethod(e.to_string()),
            other => EnvelopeError::MalformedHeader(other.to_string()),
        }
    }
}

impl From<CryptoError> for EnvelopeError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::TagMismatch => EnvelopeError::AuthenticationFailure,
            CryptoError::KeyUnwrap => EnvelopeError::KeyUnwrapFailure,
            other => EnvelopeError::InvalidInput(other.to_string()),
        }
    }
}
