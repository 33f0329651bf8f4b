//! headers/mod.rs
//! Envelope packer: stateless (de)serialization of both header layouts.
//!
//! Notes:
//! - Big-endian across all multi-byte integers.
//! - The header is not bound into the GCM tag. Tampering with salt, IV, or
//!   wrapped key changes the key stream and fails authentication; tampering
//!   with `plaintext_len` is caught by the engine's length check.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
