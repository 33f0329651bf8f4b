//! headers/encode.rs
//!
//! Header encoding. All multi-byte integers are big-endian.

use byteorder::{BigEndian, ByteOrder};

use crate::constants::{IV_LEN, SALT_LEN};
use crate::headers::types::{
    EnvelopeHeader, HeaderError, HeaderMeta, HeaderStart, HybridHeader, Method, SymmetricHeader,
};

/// Serialize a password-envelope header into its fixed 38-byte block.
pub fn pack_symmetric_header(h: &SymmetricHeader) -> [u8; SymmetricHeader::LEN] {
    let mut out = [0u8; SymmetricHeader::LEN];
    let mut i = 0usize;

    out[i] = h.version;                                          // 0     version
    i += 1;
    out[i] = Method::PasswordAesGcm.code();                      // 1     method
    i += 1;
    out[i..i + SALT_LEN].copy_from_slice(&h.salt);               // 2..18 salt
    i += SALT_LEN;
    out[i..i + IV_LEN].copy_from_slice(&h.iv);                   // 18..30 iv
    i += IV_LEN;
    BigEndian::write_u64(&mut out[i..i + 8], h.plaintext_len);   // 30..38 plaintext_len
    i += 8;

    debug_assert_eq!(i, SymmetricHeader::LEN, "encoding wrote incorrect length");
    out
}

/// Serialize a hybrid header:
/// `version | method | wrapped_key_len:u16 | wrapped_key | iv | plaintext_len:u64`.
pub fn pack_hybrid_header(
    version: u8,
    method: u8,
    iv: &[u8; IV_LEN],
    wrapped_key: &[u8],
    plaintext_len: u64,
) -> Result<Vec<u8>, HeaderError> {
    let key_len = u16::try_from(wrapped_key.len())
        .map_err(|_| HeaderError::WrappedKeyTooLong { len: wrapped_key.len() })?;
    if key_len == 0 {
        return Err(HeaderError::EmptyWrappedKey);
    }

    let expected = HeaderStart::LEN + wrapped_key.len() + HeaderMeta::LEN;
    let mut out = Vec::with_capacity(expected);

    // --- Start ---
    let mut start = [0u8; HeaderStart::LEN];
    start[0] = version;
    start[1] = method;
    BigEndian::write_u16(&mut start[2..4], key_len);
    out.extend_from_slice(&start);

    // --- Wrapped key ---
    out.extend_from_slice(wrapped_key);

    // --- Meta ---
    let mut meta = [0u8; HeaderMeta::LEN];
    meta[..IV_LEN].copy_from_slice(iv);
    BigEndian::write_u64(&mut meta[IV_LEN..], plaintext_len);
    out.extend_from_slice(&meta);

    debug_assert_eq!(out.len(), expected, "encoding wrote incorrect length");
    Ok(out)
}

/// Convenience over [`pack_hybrid_header`] for a typed header.
pub fn encode_hybrid_header(h: &HybridHeader) -> Result<Vec<u8>, HeaderError> {
    pack_hybrid_header(
        h.version,
        Method::HybridRsaAesGcm.code(),
        &h.iv,
        &h.wrapped_key,
        h.plaintext_len,
    )
}

/// Serialize either header kind.
pub fn encode_header(h: &EnvelopeHeader) -> Result<Vec<u8>, HeaderError> {
    match h {
        EnvelopeHeader::Symmetric(s) => Ok(pack_symmetric_header(s).to_vec()),
        EnvelopeHeader::Hybrid(hy) => encode_hybrid_header(hy),
    }
}
