//! telemetry/counters.rs
//! Mutable counters collected while one envelope is processed.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Deterministic counters for one encrypt or decrypt stream.
///
/// `chunks_data` counts non-empty payload chunks only; header and tag bytes
/// are recorded as overhead.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub chunks_data: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    pub bytes_overhead: u64,
}

impl TelemetryCounters {
    /// Record header bytes (written or read).
    pub fn add_header(&mut self, header_len: usize) {
        self.bytes_overhead += header_len as u64;
    }

    /// Record one payload chunk. Plaintext and ciphertext lengths are equal in GCM.
    pub fn add_chunk(&mut self, len: usize) {
        self.chunks_data += 1;
        self.bytes_plaintext += len as u64;
        self.bytes_ciphertext += len as u64;
    }

    /// Record the trailing tag.
    pub fn add_tag(&mut self, tag_len: usize) {
        self.bytes_overhead += tag_len as u64;
    }

    /// Total envelope size implied by the counters.
    pub fn envelope_bytes(&self) -> u64 {
        self.bytes_ciphertext + self.bytes_overhead
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.chunks_data      += rhs.chunks_data;
        self.bytes_plaintext  += rhs.bytes_plaintext;
        self.bytes_ciphertext += rhs.bytes_ciphertext;
        self.bytes_overhead   += rhs.bytes_overhead;
    }
}
