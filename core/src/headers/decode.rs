//! headers/decode.rs
//!
//! Header decoding. Pure functions over byte slices; the engine decides how
//! many bytes to read and hands them over here.

use byteorder::{BigEndian, ByteOrder};

use crate::constants::{IV_LEN, PREFIX_LEN, SALT_LEN};
use crate::headers::types::{HeaderError, HeaderMeta, HeaderStart, Method, SymmetricHeader};

/// Parse `(version, method)` from the first two bytes.
#[inline]
pub fn unpack_prefix(buf: &[u8]) -> Result<(u8, u8), HeaderError> {
    if buf.len() < PREFIX_LEN {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need: PREFIX_LEN });
    }
    Ok((buf[0], buf[1]))
}

/// Parse a full password-envelope header block (exactly 38 bytes).
pub fn unpack_symmetric_header(buf: &[u8]) -> Result<SymmetricHeader, HeaderError> {
    if buf.len() != SymmetricHeader::LEN {
        return Err(HeaderError::SizeMismatch { have: buf.len(), need: SymmetricHeader::LEN });
    }

    let mut off = 0;

    let version = buf[off];
    off += 1;

    let method = buf[off];
    off += 1;
    if method != Method::PasswordAesGcm.code() {
        return Err(HeaderError::MethodMismatch { expected: Method::PasswordAesGcm, have: method });
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&buf[off..off + SALT_LEN]);
    off += SALT_LEN;

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&buf[off..off + IV_LEN]);
    off += IV_LEN;

    let plaintext_len = BigEndian::read_u64(&buf[off..off + 8]);

    Ok(SymmetricHeader { version, salt, iv, plaintext_len })
}

/// Parse the 4-byte hybrid prefix. Extra trailing bytes are ignored.
pub fn unpack_header_start(buf: &[u8]) -> Result<HeaderStart, HeaderError> {
    if buf.len() < HeaderStart::LEN {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need: HeaderStart::LEN });
    }

    Ok(HeaderStart {
        version: buf[0],
        method: buf[1],
        wrapped_key_len: BigEndian::read_u16(&buf[2..4]),
    })
}

/// Parse the fixed IV + length suffix of a hybrid header (exactly 20 bytes).
pub fn unpack_meta(buf: &[u8]) -> Result<HeaderMeta, HeaderError> {
    if buf.len() != HeaderMeta::LEN {
        return Err(HeaderError::SizeMismatch { have: buf.len(), need: HeaderMeta::LEN });
    }

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&buf[..IV_LEN]);
    let plaintext_len = BigEndian::read_u64(&buf[IV_LEN..]);

    Ok(HeaderMeta { iv, plaintext_len })
}
