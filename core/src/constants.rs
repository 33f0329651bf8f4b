//! constants.rs
//! Process-wide envelope constants.
//!
//! Field sizes here are shared by the packer and the engine; the two must never
//! disagree on a header width, so nothing else in the crate hardcodes them.

/// Envelope format version written into every header.
/// Reserved for format evolution; decoders do not branch on it yet.
pub const FORMAT_VERSION: u8 = 1;

/// Method identifiers (first header byte after the version).
pub mod method_ids {
    pub const PASSWORD_AES_GCM: u8   = 0x01;
    pub const HYBRID_RSA_AES_GCM: u8 = 0x02;
}

/// PBKDF2 salt length (bytes).
pub const SALT_LEN: usize = 16;

/// AES-GCM nonce length (bytes).
pub const IV_LEN: usize = 12;

/// AES-256 key length (bytes). Also the session key length in hybrid mode.
pub const KEY_LEN: usize = 32;

/// GCM authentication tag length (bytes). Always the last bytes of an envelope.
pub const TAG_LEN: usize = 16;

/// Width of the big-endian `plaintext_len` field.
pub const LENGTH_FIELD_LEN: usize = 8;

/// Width of the big-endian `wrapped_key_len` field (hybrid headers).
pub const WRAPPED_KEY_LEN_FIELD: usize = 2;

/// version + method
pub const PREFIX_LEN: usize = 2;

/// PBKDF2-HMAC-SHA256 iteration count for password envelopes.
/// Not stored in the envelope: changing it breaks decryption of existing files.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Default streaming chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB

/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// GCM can encrypt at most 2^32 - 2 blocks under one (key, IV).
pub const MAX_GCM_PLAINTEXT_LEN: u64 = ((1u64 << 32) - 2) * 16;
