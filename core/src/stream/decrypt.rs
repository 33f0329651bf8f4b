//! stream/decrypt.rs
//! Decrypt side of the crypto engine.
//!
//! The constructor parses the header, checks that exactly
//! `plaintext_len + TAG_LEN` bytes follow it, fetches the tag from the end of
//! the source and recovers the key. Plaintext chunks are then produced lazily.
//!
//! Plaintext is released before the tag is verified. It is only authentic once
//! the iterator has ended without yielding an error; on
//! `AuthenticationFailure` everything already yielded must be discarded.

use std::io::{Read, Seek};
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::config::EnvelopeConfig;
use crate::constants::TAG_LEN;
use crate::crypto::{derive_key_with_iterations, make_decryptor, unwrap, CryptoError, GcmDecryptor, SymmetricKey};
use crate::headers::{
    unpack_header_start, unpack_meta, unpack_symmetric_header, EnvelopeHeader, HeaderError,
    HeaderMeta, HeaderStart, HybridHeader, Method, SymmetricHeader,
};
use crate::stream::io::{measure_remaining, peek_prefix, read_exact_or_eof, read_header_bytes, read_tag_at};
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::EnvelopeError;

enum DecryptState {
    Body,
    Finalize,
    Done,
}

/// Lazy plaintext producer over a seekable envelope source.
pub struct DecryptStream<R> {
    source: R,
    header: EnvelopeHeader,
    remaining: u64,
    chunk_size: usize,
    cipher: Option<GcmDecryptor>,
    state: DecryptState,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
}

/// Read and parse the header at the current position of `source`.
/// On success the source is positioned at the first ciphertext byte.
pub fn read_header<R: Read + Seek>(source: &mut R) -> Result<EnvelopeHeader, EnvelopeError> {
    let [_, method_code] = peek_prefix(source)?;

    match Method::from_code(method_code)? {
        Method::PasswordAesGcm => {
            let raw = read_header_bytes(source, SymmetricHeader::LEN)?;
            Ok(EnvelopeHeader::Symmetric(unpack_symmetric_header(&raw)?))
        }
        Method::HybridRsaAesGcm => {
            let start = unpack_header_start(&read_header_bytes(source, HeaderStart::LEN)?)?;
            if start.wrapped_key_len == 0 {
                return Err(HeaderError::EmptyWrappedKey.into());
            }
            let wrapped_key = read_header_bytes(source, start.wrapped_key_len as usize)?;
            let meta = unpack_meta(&read_header_bytes(source, HeaderMeta::LEN)?)?;

            Ok(EnvelopeHeader::Hybrid(HybridHeader {
                version: start.version,
                wrapped_key,
                iv: meta.iv,
                plaintext_len: meta.plaintext_len,
            }))
        }
    }
}

fn recover_key(
    header: &EnvelopeHeader,
    credential: &str,
    config: &EnvelopeConfig,
) -> Result<SymmetricKey, CryptoError> {
    match header {
        EnvelopeHeader::Symmetric(h) => {
            derive_key_with_iterations(credential, &h.salt, config.pbkdf2_iterations)
        }
        EnvelopeHeader::Hybrid(h) => unwrap(&h.wrapped_key, credential),
    }
}

impl<R: Read + Seek> DecryptStream<R> {
    /// Open the envelope starting at the current position of `source`.
    ///
    /// `credential` is the password (password mode) or the recipient's RSA
    /// private key PEM (hybrid mode).
    pub fn new(
        mut source: R,
        credential: &str,
        config: &EnvelopeConfig,
    ) -> Result<Self, EnvelopeError> {
        config.validate()?;
        let mut timer = TelemetryTimer::new();

        let t = Instant::now();
        let header = read_header(&mut source)?;
        let plaintext_len = header.plaintext_len();

        let body_len = measure_remaining(&mut source)?;
        let expected = plaintext_len.checked_add(TAG_LEN as u64);
        if expected != Some(body_len) {
            return Err(EnvelopeError::MalformedHeader(format!(
                "declared plaintext length {} does not match {} byte(s) of ciphertext and tag",
                plaintext_len, body_len
            )));
        }
        let tag = read_tag_at(&mut source, plaintext_len)?;
        timer.add_stage_time(Stage::Header, t.elapsed());

        debug!(
            method = %header.method(),
            version = header.version(),
            plaintext_len,
            header_len = header.encoded_len(),
            "envelope header read"
        );

        let key = timer
            .time(Stage::KeySetup, || recover_key(&header, credential, config))
            .map_err(|e| {
                if e == CryptoError::KeyUnwrap {
                    warn!(method = %header.method(), "session key unwrap failed");
                }
                e
            })?;
        let cipher = make_decryptor(&key, header.iv(), &tag);

        let mut counters = TelemetryCounters::default();
        counters.add_header(header.encoded_len());

        Ok(Self {
            source,
            remaining: plaintext_len,
            header,
            chunk_size: config.chunk_size,
            cipher: Some(cipher),
            state: DecryptState::Body,
            counters,
            timer,
        })
    }

    fn next_chunk(&mut self) -> Result<Bytes, EnvelopeError> {
        let want = (self.chunk_size as u64).min(self.remaining) as usize;
        let chunk = read_exact_or_eof(&mut self.source, want)?;
        if chunk.len() < want {
            return Err(EnvelopeError::MalformedHeader(format!(
                "ciphertext truncated: {} byte(s) missing",
                self.remaining - chunk.len() as u64
            )));
        }

        let mut buf = Vec::from(chunk);
        let cipher = self.cipher.as_mut().ok_or_else(|| {
            EnvelopeError::InvalidInput("decryptor already finalized".into())
        })?;
        let t = Instant::now();
        cipher.update_in_place(&mut buf)?;
        self.timer.add_stage_time(Stage::Crypt, t.elapsed());

        self.remaining -= buf.len() as u64;
        self.counters.add_chunk(buf.len());
        trace!(len = buf.len(), remaining = self.remaining, "plaintext chunk");
        Ok(Bytes::from(buf))
    }

    fn finish(&mut self) -> Result<(), EnvelopeError> {
        let cipher = match self.cipher.take() {
            Some(c) => c,
            None => return Ok(()),
        };
        let verdict = self.timer.time(Stage::Finalize, || cipher.finalize());
        self.counters.add_tag(TAG_LEN);
        self.timer.finish();

        match verdict {
            Ok(()) => {
                debug!(
                    method = %self.header.method(),
                    chunks = self.counters.chunks_data,
                    bytes = self.counters.bytes_plaintext,
                    "envelope authenticated"
                );
                Ok(())
            }
            Err(e) => {
                warn!(method = %self.header.method(), "envelope authentication failed");
                Err(e.into())
            }
        }
    }
}

impl<R> DecryptStream<R> {
    pub fn header(&self) -> &EnvelopeHeader {
        &self.header
    }

    pub fn method(&self) -> Method {
        self.header.method()
    }

    pub fn plaintext_len(&self) -> u64 {
        self.header.plaintext_len()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(self.header.method(), &self.counters, &self.timer)
    }
}

impl<R: Read + Seek> Iterator for DecryptStream<R> {
    type Item = Result<Bytes, EnvelopeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, DecryptState::Done) {
                DecryptState::Body if self.remaining == 0 => {
                    self.state = DecryptState::Finalize;
                }
                DecryptState::Body => {
                    return match self.next_chunk() {
                        Ok(chunk) => {
                            self.state = DecryptState::Body;
                            Some(Ok(chunk))
                        }
                        Err(e) => {
                            self.cipher = None;
                            debug!(error = %e, "decrypt stream failed");
                            Some(Err(e))
                        }
                    };
                }
                DecryptState::Finalize => return self.finish().err().map(Err),
                DecryptState::Done => return None,
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for DecryptStream<R> {}
