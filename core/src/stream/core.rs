//! stream/core.rs
//! Stable public API of the crypto engine.

use std::io::{Cursor, Read, Seek, Write};

use bytes::Bytes;

use crate::config::EnvelopeConfig;
use crate::headers::Method;
use crate::stream::decrypt::DecryptStream;
use crate::stream::encrypt::{EncryptStream, Material};
use crate::stream::io::{open_input, open_output, InputSource, OutputSink, SinkWriter};
use crate::telemetry::TelemetrySnapshot;
use crate::types::EnvelopeError;

/// Suffix appended to encrypted file names.
pub const ENCRYPTED_SUFFIX: &str = ".enc";

/// Result of driving a stream into an `OutputSink`.
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    pub telemetry: TelemetrySnapshot,
    /// Bytes written, captured for `OutputSink::Memory` only.
    pub output: Option<Vec<u8>>,
}

/// 🔐 Start an envelope for `source` using a method name (`"aes"`, `"hybrid"`, ...).
pub fn stream_encrypt<R: Read + Seek>(
    source: R,
    credential: &str,
    method_name: &str,
) -> Result<EncryptStream<R>, EnvelopeError> {
    let method = Method::from_name(method_name)?;
    stream_encrypt_with(source, credential, method, &EnvelopeConfig::default())
}

pub fn stream_encrypt_with<R: Read + Seek>(
    source: R,
    credential: &str,
    method: Method,
    config: &EnvelopeConfig,
) -> Result<EncryptStream<R>, EnvelopeError> {
    EncryptStream::new(source, credential, Material::fresh(method), config)
}

/// 🔓 Open the envelope in `source`. The method comes from the header.
pub fn stream_decrypt<R: Read + Seek>(
    source: R,
    credential: &str,
) -> Result<DecryptStream<R>, EnvelopeError> {
    stream_decrypt_with(source, credential, &EnvelopeConfig::default())
}

pub fn stream_decrypt_with<R: Read + Seek>(
    source: R,
    credential: &str,
    config: &EnvelopeConfig,
) -> Result<DecryptStream<R>, EnvelopeError> {
    DecryptStream::new(source, credential, config)
}

fn drain<I>(stream: &mut I, writer: &mut SinkWriter) -> Result<(), EnvelopeError>
where
    I: Iterator<Item = Result<Bytes, EnvelopeError>>,
{
    for chunk in stream {
        writer.write_all(&chunk?)?;
    }
    writer.flush()?;
    Ok(())
}

fn finish_outcome(
    result: Result<TelemetrySnapshot, EnvelopeError>,
    writer: SinkWriter,
) -> Result<StreamOutcome, EnvelopeError> {
    match result {
        Ok(telemetry) => Ok(StreamOutcome { telemetry, output: writer.into_captured() }),
        Err(e) => {
            writer.discard();
            Err(e)
        }
    }
}

/// Encrypt `input` into `output`. A failed run removes a partially written file sink.
pub fn encrypt(
    input: InputSource,
    output: OutputSink,
    credential: &str,
    method: Method,
    config: &EnvelopeConfig,
) -> Result<StreamOutcome, EnvelopeError> {
    let reader = open_input(input)?;
    let mut writer = open_output(output)?;

    let result = stream_encrypt_with(reader, credential, method, config).and_then(|mut stream| {
        drain(&mut stream, &mut writer)?;
        Ok(stream.snapshot())
    });
    finish_outcome(result, writer)
}

/// Decrypt `input` into `output`.
///
/// For `OutputSink::File` a failed run (including `AuthenticationFailure`)
/// deletes the partial file so unauthenticated plaintext is not left behind.
/// Writer sinks have no such cleanup; the caller owns what was written.
pub fn decrypt(
    input: InputSource,
    output: OutputSink,
    credential: &str,
    config: &EnvelopeConfig,
) -> Result<StreamOutcome, EnvelopeError> {
    let reader = open_input(input)?;
    let mut writer = open_output(output)?;

    let result = stream_decrypt_with(reader, credential, config).and_then(|mut stream| {
        drain(&mut stream, &mut writer)?;
        Ok(stream.snapshot())
    });
    finish_outcome(result, writer)
}

fn collect<I>(stream: I, capacity: usize) -> Result<Vec<u8>, EnvelopeError>
where
    I: Iterator<Item = Result<Bytes, EnvelopeError>>,
{
    let mut out = Vec::with_capacity(capacity);
    for chunk in stream {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}

/// Encrypt an in-memory buffer into a complete envelope.
pub fn encrypt_bytes(data: &[u8], credential: &str, method_name: &str) -> Result<Vec<u8>, EnvelopeError> {
    let stream = stream_encrypt(Cursor::new(data), credential, method_name)?;
    let capacity = stream.envelope_len() as usize;
    collect(stream, capacity)
}

/// Decrypt a complete in-memory envelope. Returns plaintext only if authentic.
pub fn decrypt_bytes(envelope: &[u8], credential: &str) -> Result<Vec<u8>, EnvelopeError> {
    let stream = stream_decrypt(Cursor::new(envelope), credential)?;
    let capacity = stream.plaintext_len() as usize;
    collect(stream, capacity)
}

/// `report.pdf` -> `report.pdf.enc`
pub fn encrypted_file_name(name: &str) -> String {
    format!("{}{}", name, ENCRYPTED_SUFFIX)
}

/// `report.pdf.enc` -> `report.pdf`; names without the suffix are returned unchanged.
pub fn decrypted_file_name(name: &str) -> String {
    name.strip_suffix(ENCRYPTED_SUFFIX).unwrap_or(name).to_string()
}
