//! stream: the crypto engine.
//!
//! Single-pass, pull-based envelope streams over seekable sources, plus the
//! sink-driving helpers built on top of them.

pub mod io;
pub mod encrypt;
pub mod decrypt;
pub mod core;

pub use io::{spool_forward_only, InputSource, OutputSink};
pub use encrypt::{EncryptStream, Material};
pub use decrypt::{read_header, DecryptStream};
pub use self::core::{
    decrypt, decrypt_bytes, decrypted_file_name, encrypt, encrypt_bytes, encrypted_file_name,
    stream_decrypt, stream_decrypt_with, stream_encrypt, stream_encrypt_with, StreamOutcome,
    ENCRYPTED_SUFFIX,
};
