// Sink/source normalization: files, memory, writers, and cleanup of partial
// plaintext when decryption fails.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use envelope_core::config::EnvelopeConfig;
    use envelope_core::headers::Method;
    use envelope_core::stream::{
        decrypt, decrypted_file_name, encrypt, encrypted_file_name, InputSource, OutputSink,
    };
    use envelope_core::types::EnvelopeError;

    const RECIPIENT_PUBLIC: &str = include_str!("fixtures/recipient_public.pem");
    const RECIPIENT_PRIVATE: &str = include_str!("fixtures/recipient_private.pem");

    fn fast() -> EnvelopeConfig {
        EnvelopeConfig { pbkdf2_iterations: 1_000, ..EnvelopeConfig::default() }
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 253) as u8).collect()
    }

    /// `Write` handle over a shared buffer so the test can inspect it afterwards.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for SharedBuf {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn file_to_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let plain_path = dir.path().join("report.bin");
        let enc_path = dir.path().join(encrypted_file_name("report.bin"));
        let out_path = dir.path().join(decrypted_file_name(&encrypted_file_name("report.bin")) + ".out");

        let data = sample(150_000);
        fs::write(&plain_path, &data).unwrap();

        let enc = encrypt(
            InputSource::File(plain_path.clone()),
            OutputSink::File(enc_path.clone()),
            "pw",
            Method::PasswordAesGcm,
            &fast(),
        )
        .unwrap();
        assert!(enc.output.is_none());
        assert_eq!(enc.telemetry.chunks_data, 3);
        assert_eq!(fs::metadata(&enc_path).unwrap().len(), 38 + 150_000 + 16);

        let dec = decrypt(
            InputSource::File(enc_path),
            OutputSink::File(out_path.clone()),
            "pw",
            &fast(),
        )
        .unwrap();
        assert_eq!(dec.telemetry.bytes_plaintext, 150_000);
        assert_eq!(fs::read(&out_path).unwrap(), data);
    }

    #[test]
    fn memory_sink_captures_envelope() {
        let enc = encrypt(
            InputSource::Memory(b"hello".to_vec()),
            OutputSink::Memory,
            RECIPIENT_PUBLIC,
            Method::HybridRsaAesGcm,
            &fast(),
        )
        .unwrap();
        let envelope = enc.output.unwrap();
        assert_eq!(envelope.len(), 24 + 256 + 5 + 16);

        let dec = decrypt(
            InputSource::Reader(Box::new(Cursor::new(envelope))),
            OutputSink::Memory,
            RECIPIENT_PRIVATE,
            &fast(),
        )
        .unwrap();
        assert_eq!(dec.output.unwrap(), b"hello");
        assert_eq!(dec.telemetry.method, Method::HybridRsaAesGcm);
    }

    #[test]
    fn writer_sink_receives_bytes() {
        let buf = SharedBuf::default();
        encrypt(
            InputSource::Memory(sample(10)),
            OutputSink::Writer(Box::new(buf.clone())),
            "pw",
            Method::PasswordAesGcm,
            &fast(),
        )
        .unwrap();
        assert_eq!(buf.0.lock().unwrap().len(), 38 + 10 + 16);
    }

    #[test]
    fn failed_decrypt_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("plain.out");

        let enc = encrypt(
            InputSource::Memory(sample(100_000)),
            OutputSink::Memory,
            "right",
            Method::PasswordAesGcm,
            &fast(),
        )
        .unwrap();

        let err = decrypt(
            InputSource::Memory(enc.output.unwrap()),
            OutputSink::File(out_path.clone()),
            "wrong",
            &fast(),
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::AuthenticationFailure));
        assert!(!out_path.exists(), "unauthenticated plaintext left on disk");
    }

    #[test]
    fn missing_input_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encrypt(
            InputSource::File(dir.path().join("nope")),
            OutputSink::Memory,
            "pw",
            Method::PasswordAesGcm,
            &fast(),
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::Io(_)));
    }
}
