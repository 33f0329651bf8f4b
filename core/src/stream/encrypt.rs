//! stream/encrypt.rs
//! Encrypt side of the crypto engine.
//!
//! Output order is fixed: header, ciphertext chunks, tag. Everything up to
//! the header is prepared eagerly in the constructor (length measurement,
//! key derivation or wrapping); payload chunks are read and encrypted lazily,
//! one per `next()`.

use std::io::{Read, Seek};
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::EnvelopeConfig;
use crate::constants::{IV_LEN, MAX_GCM_PLAINTEXT_LEN, SALT_LEN, TAG_LEN};
use crate::crypto::{
    derive_key_with_iterations, generate_session_key, make_encryptor, random_iv, random_salt,
    wrap, GcmEncryptor, SymmetricKey,
};
use crate::headers::{encode_header, EnvelopeHeader, HybridHeader, Method, SymmetricHeader};
use crate::stream::io::{measure_remaining, read_exact_or_eof};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::EnvelopeError;

/// Per-envelope randomness.
///
/// [`Material::fresh`] is what every regular encrypt uses. Constructing one by
/// hand pins the salt/IV/session key and makes the output reproducible; an IV
/// must never be reused under the same key.
pub enum Material {
    Password { salt: [u8; SALT_LEN], iv: [u8; IV_LEN] },
    Hybrid { session_key: SymmetricKey, iv: [u8; IV_LEN] },
}

impl Material {
    /// Fresh salt/IV or session key/IV from the OS RNG.
    pub fn fresh(method: Method) -> Self {
        match method {
            Method::PasswordAesGcm => Material::Password { salt: random_salt(), iv: random_iv() },
            Method::HybridRsaAesGcm => Material::Hybrid {
                session_key: generate_session_key(),
                iv: random_iv(),
            },
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Material::Password { .. } => Method::PasswordAesGcm,
            Material::Hybrid { .. } => Method::HybridRsaAesGcm,
        }
    }
}

enum EncryptState {
    Header(Vec<u8>),
    Body,
    Tag,
    Done,
}

/// Lazy envelope producer over a seekable plaintext source.
pub struct EncryptStream<R> {
    source: R,
    method: Method,
    header_len: usize,
    plaintext_len: u64,
    remaining: u64,
    chunk_size: usize,
    cipher: Option<GcmEncryptor>,
    state: EncryptState,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

impl<R: Read + Seek> EncryptStream<R> {
    /// Prepare an envelope for the bytes from the current position of `source`
    /// to its end.
    ///
    /// `credential` is the password (password mode) or the recipient's RSA
    /// public key PEM (hybrid mode).
    pub fn new(
        mut source: R,
        credential: &str,
        material: Material,
        config: &EnvelopeConfig,
    ) -> Result<Self, EnvelopeError> {
        config.validate()?;
        let mut timer = TelemetryTimer::new();

        let plaintext_len = measure_remaining(&mut source)?;
        if plaintext_len > MAX_GCM_PLAINTEXT_LEN {
            return Err(EnvelopeError::InvalidInput(format!(
                "plaintext of {} bytes exceeds the AES-GCM limit of {} bytes",
                plaintext_len, MAX_GCM_PLAINTEXT_LEN
            )));
        }

        let (header, key) = match material {
            Material::Password { salt, iv } => {
                let key = timer.time(Stage::KeySetup, || {
                    derive_key_with_iterations(credential, &salt, config.pbkdf2_iterations)
                })?;
                (EnvelopeHeader::Symmetric(SymmetricHeader::new(salt, iv, plaintext_len)), key)
            }
            Material::Hybrid { session_key, iv } => {
                let wrapped = timer.time(Stage::KeySetup, || wrap(&session_key, credential))?;
                (EnvelopeHeader::Hybrid(HybridHeader::new(wrapped, iv, plaintext_len)), session_key)
            }
        };

        let header_bytes = timer.time(Stage::Header, || encode_header(&header))?;
        let cipher = make_encryptor(&key, header.iv());
        let method = header.method();

        debug!(
            %method,
            plaintext_len,
            header_len = header_bytes.len(),
            chunk_size = config.chunk_size,
            "envelope header ready"
        );

        Ok(Self {
            source,
            method,
            header_len: header_bytes.len(),
            plaintext_len,
            remaining: plaintext_len,
            chunk_size: config.chunk_size,
            cipher: Some(cipher),
            state: EncryptState::Header(header_bytes),
            counters: TelemetryCounters::default(),
            timer,
        })
    }

    fn next_chunk(&mut self) -> Result<Bytes, EnvelopeError> {
        let want = (self.chunk_size as u64).min(self.remaining) as usize;
        let chunk = read_exact_or_eof(&mut self.source, want)?;
        if chunk.len() < want {
            return Err(EnvelopeError::InvalidInput(format!(
                "source ended {} byte(s) short of its measured length",
                self.remaining - chunk.len() as u64
            )));
        }

        let mut buf = Vec::from(chunk);
        let cipher = self.cipher.as_mut().ok_or_else(|| {
            EnvelopeError::InvalidInput("encryptor already finalized".into())
        })?;
        let t = Instant::now();
        cipher.update_in_place(&mut buf)?;
        self.timer.add_stage_time(Stage::Crypt, t.elapsed());

        self.remaining -= buf.len() as u64;
        self.counters.add_chunk(buf.len());
        trace!(len = buf.len(), remaining = self.remaining, "ciphertext chunk");
        Ok(Bytes::from(buf))
    }

    fn finish(&mut self) -> Option<Bytes> {
        let cipher = self.cipher.take()?;
        let tag = self.timer.time(Stage::Finalize, || cipher.finalize());
        self.counters.add_tag(TAG_LEN);
        self.timer.finish();
        debug!(
            method = %self.method,
            chunks = self.counters.chunks_data,
            bytes = self.counters.bytes_plaintext,
            "envelope tag written"
        );
        Some(Bytes::copy_from_slice(&tag))
    }
}

impl<R> EncryptStream<R> {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn plaintext_len(&self) -> u64 {
        self.plaintext_len
    }

    /// Total bytes this stream will emit.
    pub fn envelope_len(&self) -> u64 {
        self.header_len as u64 + self.plaintext_len + TAG_LEN as u64
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(self.method, &self.counters, &self.timer)
    }
}

impl<R: Read + Seek> Iterator for EncryptStream<R> {
    type Item = Result<Bytes, EnvelopeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, EncryptState::Done) {
                EncryptState::Header(bytes) => {
                    self.counters.add_header(bytes.len());
                    self.state = EncryptState::Body;
                    return Some(Ok(Bytes::from(bytes)));
                }
                EncryptState::Body if self.remaining == 0 => {
                    self.state = EncryptState::Tag;
                }
                EncryptState::Body => {
                    return match self.next_chunk() {
                        Ok(chunk) => {
                            self.state = EncryptState::Body;
                            Some(Ok(chunk))
                        }
                        Err(e) => {
                            self.cipher = None;
                            debug!(error = %e, "encrypt stream failed");
                            Some(Err(e))
                        }
                    };
                }
                EncryptState::Tag => return self.finish().map(Ok),
                EncryptState::Done => return None,
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for EncryptStream<R> {}
