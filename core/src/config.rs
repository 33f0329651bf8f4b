//! config.rs
//! Runtime knobs shared by the encrypt and decrypt engines.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, PBKDF2_ITERATIONS};
use crate::types::EnvelopeError;

/// Immutable configuration for one encrypt or decrypt call.
///
/// `chunk_size` only affects memory use and how output is split into chunks;
/// envelopes are byte-identical for any chunk size. `pbkdf2_iterations` is NOT
/// recorded in the envelope, so both sides must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub chunk_size: usize,
    pub pbkdf2_iterations: u32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            pbkdf2_iterations: PBKDF2_ITERATIONS,
        }
    }
}

impl EnvelopeConfig {
    /// Default config with a different chunk size.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self { chunk_size, ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.chunk_size == 0 {
            return Err(EnvelopeError::InvalidInput("chunk_size must be > 0".into()));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(EnvelopeError::InvalidInput(format!(
                "chunk_size {} exceeds maximum {}",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        if self.pbkdf2_iterations == 0 {
            return Err(EnvelopeError::InvalidInput("pbkdf2_iterations must be >= 1".into()));
        }
        Ok(())
    }
}
