//! crypto/gcm.rs
//! Incremental AES-256-GCM (symmetric cipher adapter).
//!
//! Design notes:
//! - One (key, IV) per envelope, 12-byte IV, 16-byte tag, no AAD.
//! - Built from AES-CTR (32-bit big-endian counter) plus GHASH, so input can be
//!   fed in arbitrary pieces. Output is byte-identical to one-shot AES-GCM
//!   regardless of how the input is split.
//! - Encryptor emits ciphertext per `update`; `finalize` yields the tag.
//! - Decryptor emits plaintext per `update` BEFORE the tag is checked. Callers
//!   must treat that plaintext as provisional until `finalize` returns `Ok`.
//! - `finalize` consumes the object, so no update can follow it.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, InnerIvInit, KeyInit, StreamCipher};
use aes::{Aes256, Block};
use byteorder::{BigEndian, ByteOrder};
use ctr::Ctr32BE;
use ghash::universal_hash::UniversalHash;
use ghash::GHash;
use subtle::ConstantTimeEq;

use crate::constants::{IV_LEN, MAX_GCM_PLAINTEXT_LEN, TAG_LEN};
use crate::crypto::types::{CryptoError, SymmetricKey};

type Aes256Ctr = Ctr32BE<Aes256>;

const BLOCK_LEN: usize = 16;

/// State shared by both directions: keystream, GHASH over ciphertext, tag mask.
struct GcmState {
    keystream: Aes256Ctr,
    ghash: GHash,
    tag_mask: Block,
    /// Ciphertext bytes not yet forming a full GHASH block.
    pending: [u8; BLOCK_LEN],
    pending_len: usize,
    processed: u64,
}

impl GcmState {
    fn new(key: &SymmetricKey, iv: &[u8; IV_LEN]) -> Self {
        let cipher = Aes256::new(GenericArray::from_slice(key.as_bytes()));

        // H = E_K(0^128)
        let mut h = Block::default();
        cipher.encrypt_block(&mut h);
        let ghash = GHash::new(&h);

        // J0 = IV || 0^31 || 1
        let mut j0 = Block::default();
        j0[..IV_LEN].copy_from_slice(iv);
        j0[BLOCK_LEN - 1] = 1;

        // First keystream block is E_K(J0), the tag mask; data starts at inc32(J0).
        let mut keystream = Aes256Ctr::from_core(ctr::CtrCore::inner_iv_init(cipher, &j0));
        let mut tag_mask = Block::default();
        keystream.apply_keystream(&mut tag_mask);

        Self {
            keystream,
            ghash,
            tag_mask,
            pending: [0u8; BLOCK_LEN],
            pending_len: 0,
            processed: 0,
        }
    }

    fn reserve(&mut self, len: usize) -> Result<(), CryptoError> {
        let total = self
            .processed
            .checked_add(len as u64)
            .ok_or(CryptoError::LengthLimit)?;
        if total > MAX_GCM_PLAINTEXT_LEN {
            return Err(CryptoError::LengthLimit);
        }
        self.processed = total;
        Ok(())
    }

    fn apply_keystream(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.keystream
            .try_apply_keystream(buf)
            .map_err(|_| CryptoError::LengthLimit)
    }

    /// Feed ciphertext into GHASH, carrying partial blocks across calls.
    fn absorb(&mut self, mut data: &[u8]) {
        if self.pending_len > 0 {
            let take = (BLOCK_LEN - self.pending_len).min(data.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&data[..take]);
            self.pending_len += take;
            data = &data[take..];

            if self.pending_len < BLOCK_LEN {
                return;
            }
            self.ghash.update(&[Block::clone_from_slice(&self.pending)]);
            self.pending_len = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            self.ghash.update(&[Block::clone_from_slice(block)]);
        }

        let rest = blocks.remainder();
        self.pending[..rest.len()].copy_from_slice(rest);
        self.pending_len = rest.len();
    }

    fn compute_tag(mut self) -> [u8; TAG_LEN] {
        if self.pending_len > 0 {
            self.ghash.update_padded(&self.pending[..self.pending_len]);
        }

        // len(A) = 0 bits || len(C) in bits
        let mut lengths = Block::default();
        BigEndian::write_u64(&mut lengths[8..], self.processed * 8);
        self.ghash.update(&[lengths]);

        let s = self.ghash.finalize();
        let mut tag = [0u8; TAG_LEN];
        for (i, t) in tag.iter_mut().enumerate() {
            *t = s[i] ^ self.tag_mask[i];
        }
        tag
    }
}

/// Streaming AES-256-GCM encryptor.
pub struct GcmEncryptor {
    state: GcmState,
}

impl GcmEncryptor {
    /// Encrypt `buf` in place and fold the ciphertext into the tag.
    pub fn update_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.state.reserve(buf.len())?;
        self.state.apply_keystream(buf)?;
        self.state.absorb(buf);
        Ok(())
    }

    /// Encrypt `plaintext`; returns ciphertext of the same length.
    pub fn update(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = plaintext.to_vec();
        self.update_in_place(&mut out)?;
        Ok(out)
    }

    /// Bytes encrypted so far.
    pub fn processed(&self) -> u64 {
        self.state.processed
    }

    /// Complete the computation and return the 16-byte tag.
    pub fn finalize(self) -> [u8; TAG_LEN] {
        self.state.compute_tag()
    }
}

/// Streaming AES-256-GCM decryptor bound to the expected tag.
pub struct GcmDecryptor {
    state: GcmState,
    expected_tag: [u8; TAG_LEN],
}

impl GcmDecryptor {
    /// Decrypt `buf` in place. The result is unauthenticated until `finalize`.
    pub fn update_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.state.reserve(buf.len())?;
        self.state.absorb(buf);
        self.state.apply_keystream(buf)?;
        Ok(())
    }

    /// Decrypt `ciphertext`; returns provisional plaintext of the same length.
    pub fn update(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = ciphertext.to_vec();
        self.update_in_place(&mut out)?;
        Ok(out)
    }

    pub fn processed(&self) -> u64 {
        self.state.processed
    }

    /// Verify the tag over everything fed in. Constant-time comparison.
    ///
    /// Errors:
    /// - mismatch -> `CryptoError::TagMismatch`
    pub fn finalize(self) -> Result<(), CryptoError> {
        let expected = self.expected_tag;
        let computed = self.state.compute_tag();
        if bool::from(computed[..].ct_eq(&expected[..])) {
            Ok(())
        } else {
            Err(CryptoError::TagMismatch)
        }
    }
}

/// Encryptor for `(key, iv)`. Never reuse an IV under the same key.
pub fn make_encryptor(key: &SymmetricKey, iv: &[u8; IV_LEN]) -> GcmEncryptor {
    GcmEncryptor { state: GcmState::new(key, iv) }
}

/// Decryptor for `(key, iv)` that will check against `tag` at finalize.
pub fn make_decryptor(key: &SymmetricKey, iv: &[u8; IV_LEN], tag: &[u8; TAG_LEN]) -> GcmDecryptor {
    GcmDecryptor { state: GcmState::new(key, iv), expected_tag: *tag }
}
