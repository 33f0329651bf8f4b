//! crypto/wrap.rs
//! Hybrid key wrapper: RSA-OAEP(SHA-256, MGF1-SHA-256) over a 32-byte session key.
//!
//! Notes:
//! - Public keys: SPKI PEM ("BEGIN PUBLIC KEY"), PKCS#1 PEM accepted as fallback.
//! - Private keys: PKCS#8 PEM ("BEGIN PRIVATE KEY"), PKCS#1 PEM accepted as fallback.
//! - Every unwrap failure (bad PEM, wrong key, OAEP padding error, wrong
//!   recovered length) collapses into `CryptoError::KeyUnwrap` so callers
//!   cannot tell them apart.

use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::constants::KEY_LEN;
use crate::crypto::types::{CryptoError, SymmetricKey};

/// Fresh random session key from the OS CSPRNG.
pub fn generate_session_key() -> SymmetricKey {
    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    OsRng.fill_bytes(&mut *bytes);
    SymmetricKey::from_bytes(*bytes)
}

/// Parse a recipient public key.
///
/// Errors:
/// - unparseable PEM -> `CryptoError::InvalidPublicKey`
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    let pem = pem.trim();
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, CryptoError> {
    let pem = pem.trim();
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        .map_err(|_| CryptoError::KeyUnwrap)
}

/// Encrypt `session_key` to the holder of `public_key_pem`.
/// Output length equals the RSA modulus size in bytes (256 for RSA-2048).
pub fn wrap(session_key: &SymmetricKey, public_key_pem: &str) -> Result<Vec<u8>, CryptoError> {
    let public_key = parse_public_key(public_key_pem)?;
    wrap_with_key(session_key, &public_key)
}

/// [`wrap`] against an already parsed key.
pub fn wrap_with_key(
    session_key: &SymmetricKey,
    public_key: &RsaPublicKey,
) -> Result<Vec<u8>, CryptoError> {
    public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), session_key.as_bytes())
        .map_err(|e| CryptoError::WrapFailed(e.to_string()))
}

/// Recover the session key from `wrapped` with `private_key_pem`.
///
/// Errors:
/// - any failure -> `CryptoError::KeyUnwrap`
pub fn unwrap(wrapped: &[u8], private_key_pem: &str) -> Result<SymmetricKey, CryptoError> {
    let private_key = parse_private_key(private_key_pem)?;
    unwrap_with_key(wrapped, &private_key)
}

/// [`unwrap`] against an already parsed key.
pub fn unwrap_with_key(
    wrapped: &[u8],
    private_key: &RsaPrivateKey,
) -> Result<SymmetricKey, CryptoError> {
    let recovered = private_key
        .decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), wrapped)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::KeyUnwrap)?;

    SymmetricKey::from_slice(&recovered).ok_or(CryptoError::KeyUnwrap)
}
