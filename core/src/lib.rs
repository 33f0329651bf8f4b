//! envelope-core
//!
//! Streaming authenticated file envelopes: password (PBKDF2-HMAC-SHA256) or
//! RSA-OAEP hybrid key setup, AES-256-GCM payload.
//! Pure Rust, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod config;
pub mod types;
pub mod utils;

// Building blocks
pub mod headers;
pub mod crypto;
pub mod telemetry;

// Engine
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::EnvelopeConfig;
    pub use crate::headers::Method;
    pub use crate::stream::{
        decrypt, decrypt_bytes, encrypt, encrypt_bytes, stream_decrypt, stream_decrypt_with,
        stream_encrypt, stream_encrypt_with, DecryptStream, EncryptStream, InputSource,
        OutputSink, StreamOutcome,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::EnvelopeError;
}
