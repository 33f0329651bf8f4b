//! telemetry/snapshot.rs
//! Immutable view of one envelope's counters and timings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::headers::Method;
use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub method: Method,
    pub chunks_data: u64,
    pub bytes_plaintext: u64,
    pub bytes_ciphertext: u64,
    pub bytes_overhead: u64,
    pub throughput_plaintext_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(method: Method, counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_plaintext as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            method,
            chunks_data: counters.chunks_data,
            bytes_plaintext: counters.bytes_plaintext,
            bytes_ciphertext: counters.bytes_ciphertext,
            bytes_overhead: counters.bytes_overhead,
            throughput_plaintext_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Envelope size (header + ciphertext + tag).
    pub fn envelope_bytes(&self) -> u64 {
        self.bytes_ciphertext + self.bytes_overhead
    }

    /// Stage timings never exceed wall time and byte counters agree.
    pub fn sanity_check(&self) -> bool {
        self.bytes_ciphertext == self.bytes_plaintext
            && self.stage_times.total() <= self.elapsed
    }
}
