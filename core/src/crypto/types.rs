//! crypto/types.rs
//! Key newtype and crypto-layer errors.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::KEY_LEN;

/// A 256-bit AES key (password-derived or hybrid session key).
///
/// Zeroized on drop; never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_LEN],
}

impl SymmetricKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Copy a key out of a slice; `None` unless exactly `KEY_LEN` bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; KEY_LEN] = bytes.try_into().ok()?;
        Some(Self { bytes: arr })
    }

    pub(crate) fn zeroed() -> Self {
        Self { bytes: [0u8; KEY_LEN] }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for SymmetricKey {}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// PBKDF2 salt was empty.
    EmptySalt,

    /// PBKDF2 iteration count was zero.
    InvalidIterations,

    /// Recipient public key PEM could not be parsed.
    InvalidPublicKey(String),

    /// RSA-OAEP encryption of the session key failed (e.g. key too small).
    WrapFailed(String),

    /// Session key could not be recovered. No detail on purpose.
    KeyUnwrap,

    /// GCM tag mismatch (authentication failure).
    TagMismatch,

    /// More data than GCM allows under one (key, IV).
    LengthLimit,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CryptoError::*;
        match self {
            EmptySalt =>
                write!(f, "salt must not be empty"),
            InvalidIterations =>
                write!(f, "PBKDF2 iterations must be >= 1"),
            InvalidPublicKey(msg) =>
                write!(f, "invalid RSA public key: {}", msg),
            WrapFailed(msg) =>
                write!(f, "session key wrap failed: {}", msg),
            KeyUnwrap =>
                write!(f, "session key unwrap failed"),
            TagMismatch =>
                write!(f, "AEAD tag mismatch"),
            LengthLimit =>
                write!(f, "GCM plaintext length limit exceeded"),
        }
    }
}

impl std::error::Error for CryptoError {}
