//! crypto/kdf.rs
//! Password -> AES-256 key derivation.
//!
//! PBKDF2-HMAC-SHA256, 32-byte output. Deterministic in (password, salt,
//! iterations); nothing is cached, every call recomputes.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::constants::PBKDF2_ITERATIONS;
use crate::crypto::types::{CryptoError, SymmetricKey};

/// Derive the envelope key for `password` and `salt` at the default cost.
///
/// Errors:
/// - empty salt -> `CryptoError::EmptySalt`
#[inline]
pub fn derive_key(password: &str, salt: &[u8]) -> Result<SymmetricKey, CryptoError> {
    derive_key_with_iterations(password, salt, PBKDF2_ITERATIONS)
}

/// Same as [`derive_key`] with an explicit iteration count.
pub fn derive_key_with_iterations(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<SymmetricKey, CryptoError> {
    if salt.is_empty() {
        return Err(CryptoError::EmptySalt);
    }
    if iterations == 0 {
        return Err(CryptoError::InvalidIterations);
    }

    let mut key = SymmetricKey::zeroed();
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, key.as_mut_bytes());
    Ok(key)
}
