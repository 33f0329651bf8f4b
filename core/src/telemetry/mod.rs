//! telemetry/mod.rs
//! Per-envelope telemetry: counters, stage timers, and immutable snapshots.
//!
//! Counters are updated by the encrypt/decrypt streams as chunks are emitted
//! and frozen into a `TelemetrySnapshot` on demand. Snapshots are plain data
//! (serde) so they can be logged or exported as JSON.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
