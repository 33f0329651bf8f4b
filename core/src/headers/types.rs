//! headers/types.rs
//! Envelope header structs, the method registry, and header errors.
//!
//! Wire layouts (big-endian integers):
//!
//! ```text
//! password: [version:1][method:1][salt:16][iv:12][plaintext_len:8]                      = 38 bytes
//! hybrid:   [version:1][method:1][wrapped_key_len:2][wrapped_key:N][iv:12][plaintext_len:8] = 24 + N bytes
//! ```
//!
//! Ciphertext (`plaintext_len` bytes) and the 16-byte GCM tag follow either header.

use std::fmt;
use std::str::FromStr;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::constants::{
    method_ids, FORMAT_VERSION, IV_LEN, LENGTH_FIELD_LEN, PREFIX_LEN, SALT_LEN,
    WRAPPED_KEY_LEN_FIELD,
};
use crate::utils::enum_name_or_hex;

/// Envelope kinds (header registry).
///
/// The method code is the single source of truth for how the rest of an
/// envelope is parsed and which credential it expects.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum Method {
    /// PBKDF2-HMAC-SHA256(password, salt) -> AES-256-GCM.
    PasswordAesGcm  = method_ids::PASSWORD_AES_GCM,
    /// RSA-OAEP wrapped random session key -> AES-256-GCM.
    HybridRsaAesGcm = method_ids::HYBRID_RSA_AES_GCM,
}

impl Method {
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a header method code onto the registry.
    pub fn from_code(raw: u8) -> Result<Self, HeaderError> {
        Method::try_from_primitive(raw).map_err(|_| HeaderError::UnknownMethod { raw })
    }

    /// Resolve a user-facing method name (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, HeaderError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "aes" | "aes-gcm" | "password" => Ok(Method::PasswordAesGcm),
            "hybrid" | "rsa" => Ok(Method::HybridRsaAesGcm),
            _ => Err(HeaderError::UnknownMethodName { name: name.to_string() }),
        }
    }

    /// Canonical method name.
    pub fn name(self) -> &'static str {
        match self {
            Method::PasswordAesGcm => "aes",
            Method::HybridRsaAesGcm => "hybrid",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::from_name(s)
    }
}

/// Fixed-size header of a password envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetricHeader {
    pub version: u8,
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; IV_LEN],
    pub plaintext_len: u64,
}

impl SymmetricHeader {
    pub const LEN: usize = PREFIX_LEN + SALT_LEN + IV_LEN + LENGTH_FIELD_LEN;

    pub fn new(salt: [u8; SALT_LEN], iv: [u8; IV_LEN], plaintext_len: u64) -> Self {
        Self { version: FORMAT_VERSION, salt, iv, plaintext_len }
    }
}

/// Header of a hybrid envelope. Variable length because of the wrapped key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridHeader {
    pub version: u8,
    pub wrapped_key: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub plaintext_len: u64,
}

impl HybridHeader {
    /// Bytes of a hybrid header excluding the wrapped key itself.
    pub const FIXED_LEN: usize = HeaderStart::LEN + HeaderMeta::LEN;

    pub fn new(wrapped_key: Vec<u8>, iv: [u8; IV_LEN], plaintext_len: u64) -> Self {
        Self { version: FORMAT_VERSION, wrapped_key, iv, plaintext_len }
    }

    pub fn encoded_len(&self) -> usize {
        Self::FIXED_LEN + self.wrapped_key.len()
    }
}

/// Fixed prefix of a hybrid header: enough to size the wrapped key read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderStart {
    pub version: u8,
    pub method: u8,
    pub wrapped_key_len: u16,
}

impl HeaderStart {
    pub const LEN: usize = PREFIX_LEN + WRAPPED_KEY_LEN_FIELD;
}

/// Fixed suffix of a hybrid header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderMeta {
    pub iv: [u8; IV_LEN],
    pub plaintext_len: u64,
}

impl HeaderMeta {
    pub const LEN: usize = IV_LEN + LENGTH_FIELD_LEN;
}

/// A parsed header of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeHeader {
    Symmetric(SymmetricHeader),
    Hybrid(HybridHeader),
}

impl EnvelopeHeader {
    pub fn method(&self) -> Method {
        match self {
            EnvelopeHeader::Symmetric(_) => Method::PasswordAesGcm,
            EnvelopeHeader::Hybrid(_) => Method::HybridRsaAesGcm,
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            EnvelopeHeader::Symmetric(h) => h.version,
            EnvelopeHeader::Hybrid(h) => h.version,
        }
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        match self {
            EnvelopeHeader::Symmetric(h) => &h.iv,
            EnvelopeHeader::Hybrid(h) => &h.iv,
        }
    }

    pub fn plaintext_len(&self) -> u64 {
        match self {
            EnvelopeHeader::Symmetric(h) => h.plaintext_len,
            EnvelopeHeader::Hybrid(h) => h.plaintext_len,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            EnvelopeHeader::Symmetric(_) => SymmetricHeader::LEN,
            EnvelopeHeader::Hybrid(h) => h.encoded_len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// Buffer too short to contain the requested header part.
    BufferTooShort { have: usize, need: usize },

    /// Fixed-size header part with the wrong length.
    SizeMismatch { have: usize, need: usize },

    /// Method code not in the registry.
    UnknownMethod { raw: u8 },

    /// Method name not recognized at encrypt time.
    UnknownMethodName { name: String },

    /// Header parsed as one kind but carries another kind's code.
    MethodMismatch { expected: Method, have: u8 },

    /// Wrapped key does not fit the u16 length field.
    WrappedKeyTooLong { len: usize },

    /// Hybrid header declaring a zero-length wrapped key.
    EmptyWrappedKey,
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use HeaderError::*;
        match self {
            BufferTooShort { have, need } =>
                write!(f, "header buffer too short: {} < {}", have, need),
            SizeMismatch { have, need } =>
                write!(f, "header field size mismatch: got {}, expected {}", have, need),
            UnknownMethod { raw } =>
                write!(f, "unknown method code: {}", enum_name_or_hex::<Method>(*raw)),
            UnknownMethodName { name } =>
                write!(f, "unknown method name: {:?}", name),
            MethodMismatch { expected, have } =>
                write!(f, "expected {:?} header, found method {}",
                    expected, enum_name_or_hex::<Method>(*have)),
            WrappedKeyTooLong { len } =>
                write!(f, "wrapped key too long: {} > {}", len, u16::MAX),
            EmptyWrappedKey =>
                write!(f, "wrapped key length is zero"),
        }
    }
}

impl std::error::Error for HeaderError {}
