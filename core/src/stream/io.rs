//! stream/io.rs
//! Normalized input/output plus the seek helpers the envelope format needs.
//!
//! The format puts the plaintext length in the header and the tag at the very
//! end, so both directions need random access to the source. Forward-only
//! readers must be spooled first (`spool_forward_only`).

use std::fs::File;
use std::io::{self, BufWriter, Cursor, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use bytes::Bytes;

use crate::constants::TAG_LEN;
use crate::types::EnvelopeError;

/// Seekable byte source.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn ReadSeek + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    Memory,
}

/// Normalize an input source into a boxed seekable reader.
pub fn open_input(src: InputSource) -> Result<Box<dyn ReadSeek + Send>, EnvelopeError> {
    let reader: Box<dyn ReadSeek + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(File::open(p)?),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// An opened output sink. `Memory` keeps the written bytes.
pub enum SinkWriter {
    Writer(Box<dyn Write + Send>),
    File { file: BufWriter<File>, path: PathBuf },
    Memory(Vec<u8>),
}

impl SinkWriter {
    /// Captured bytes for `Memory` sinks.
    pub fn into_captured(self) -> Option<Vec<u8>> {
        match self {
            SinkWriter::Memory(buf) => Some(buf),
            _ => None,
        }
    }

    /// Drop a partially written output. Only file sinks can be cleaned up.
    pub fn discard(self) {
        if let SinkWriter::File { file, path } = self {
            drop(file);
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output");
            }
        }
    }
}

impl Write for SinkWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Writer(w) => w.write(data),
            SinkWriter::File { file, .. } => file.write(data),
            SinkWriter::Memory(buf) => {
                buf.extend_from_slice(data);
                Ok(data.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Writer(w) => w.flush(),
            SinkWriter::File { file, .. } => file.flush(),
            SinkWriter::Memory(_) => Ok(()),
        }
    }
}

/// Normalize an output sink into a writer.
pub fn open_output(sink: OutputSink) -> Result<SinkWriter, EnvelopeError> {
    match sink {
        OutputSink::Writer(w) => Ok(SinkWriter::Writer(w)),
        OutputSink::File(path) => {
            let file = BufWriter::new(File::create(&path)?);
            Ok(SinkWriter::File { file, path })
        }
        OutputSink::Memory => Ok(SinkWriter::Memory(Vec::new())),
    }
}

/// Buffer a forward-only reader into a seekable in-memory cursor.
pub fn spool_forward_only<R: Read>(mut reader: R) -> Result<Cursor<Vec<u8>>, EnvelopeError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(Cursor::new(buf))
}

fn seek_err(e: io::Error) -> EnvelopeError {
    EnvelopeError::SeekFailure(e)
}

/// Bytes between the current position and the end; the position is restored.
pub fn measure_remaining<R: Seek + ?Sized>(r: &mut R) -> Result<u64, EnvelopeError> {
    let start = r.stream_position().map_err(seek_err)?;
    let end = r.seek(SeekFrom::End(0)).map_err(seek_err)?;
    r.seek(SeekFrom::Start(start)).map_err(seek_err)?;
    Ok(end.saturating_sub(start))
}

/// Read `(version, method)` without consuming them.
pub fn peek_prefix<R: Read + Seek + ?Sized>(r: &mut R) -> Result<[u8; 2], EnvelopeError> {
    let start = r.stream_position().map_err(seek_err)?;
    let got = read_exact_or_eof(r, 2)?;
    r.seek(SeekFrom::Start(start)).map_err(seek_err)?;

    got.as_ref()
        .try_into()
        .map_err(|_| EnvelopeError::MalformedHeader(format!(
            "envelope too short: {} byte(s), need at least 2",
            got.len()
        )))
}

/// Read exactly `len` header bytes; running out of input is a malformed header.
pub fn read_header_bytes<R: Read + ?Sized>(r: &mut R, len: usize) -> Result<Vec<u8>, EnvelopeError> {
    let mut buf = vec![0u8; len];
    match r.read_exact(&mut buf) {
        Ok(()) => Ok(buf),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(EnvelopeError::MalformedHeader(
            format!("header truncated: needed {} more byte(s)", len),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Read the tag found `offset` bytes past the current position, then seek back.
pub fn read_tag_at<R: Read + Seek + ?Sized>(
    r: &mut R,
    offset: u64,
) -> Result<[u8; TAG_LEN], EnvelopeError> {
    let start = r.stream_position().map_err(seek_err)?;
    let tag_pos = start.checked_add(offset).ok_or_else(|| {
        EnvelopeError::MalformedHeader("declared length overflows the source".into())
    })?;
    r.seek(SeekFrom::Start(tag_pos)).map_err(seek_err)?;

    let mut tag = [0u8; TAG_LEN];
    r.read_exact(&mut tag).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => EnvelopeError::MalformedHeader("missing authentication tag".into()),
        _ => EnvelopeError::Io(e),
    })?;

    r.seek(SeekFrom::Start(start)).map_err(seek_err)?;
    Ok(tag)
}

/// Read up to `len` bytes, stopping early only at EOF.
pub fn read_exact_or_eof<R: Read + ?Sized>(r: &mut R, len: usize) -> Result<Bytes, EnvelopeError> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    buf.truncate(off);
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_restores_position() {
        let mut c = Cursor::new(vec![0u8; 10]);
        c.set_position(3);
        assert_eq!(measure_remaining(&mut c).unwrap(), 7);
        assert_eq!(c.position(), 3);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut c = Cursor::new(vec![1u8, 2, 3]);
        assert_eq!(peek_prefix(&mut c).unwrap(), [1, 2]);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn peek_short_is_malformed() {
        let mut c = Cursor::new(vec![1u8]);
        assert!(matches!(peek_prefix(&mut c), Err(EnvelopeError::MalformedHeader(_))));
    }

    #[test]
    fn read_tag_seeks_back() {
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&[9u8; TAG_LEN]);
        let mut c = Cursor::new(data);
        c.set_position(2);
        assert_eq!(read_tag_at(&mut c, 2).unwrap(), [9u8; TAG_LEN]);
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn read_exact_or_eof_short() {
        let mut c = Cursor::new(vec![5u8; 3]);
        assert_eq!(read_exact_or_eof(&mut c, 8).unwrap().len(), 3);
        assert!(read_exact_or_eof(&mut c, 8).unwrap().is_empty());
    }
}
