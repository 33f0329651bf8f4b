//! telemetry/timers.rs
//! Stage timers for one envelope.

use std::collections::{hash_map, HashMap};
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// PBKDF2 derivation or RSA wrap/unwrap.
    KeySetup,
    /// Header serialization or parsing, including source reads for it.
    Header,
    /// Keystream and GHASH over payload chunks.
    Crypt,
    /// Tag computation or verification.
    Finalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::KeySetup => "key_setup",
            Stage::Header   => "header",
            Stage::Crypt    => "crypt",
            Stage::Finalize => "finalize",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    times: HashMap<Stage, Duration>,
}

impl StageTimes {
    /// Add duration to a stage (accumulates if already present).
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.times.entry(stage).or_insert(Duration::ZERO) += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.times.get(&stage).copied().unwrap_or(Duration::ZERO)
    }

    pub fn total(&self) -> Duration {
        self.times.values().copied().sum()
    }

    /// True when every listed stage has been recorded at least once.
    pub fn has_all(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|s| self.times.contains_key(s))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Stage, &Duration)> {
        self.times.iter()
    }
}

impl<'a> IntoIterator for &'a StageTimes {
    type Item = (&'a Stage, &'a Duration);
    type IntoIter = hash_map::Iter<'a, Stage, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.times.iter()
    }
}

#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    pub start_time: Instant,
    pub end_time: Option<Instant>,
    pub stage_times: StageTimes,
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            stage_times: StageTimes::default(),
        }
    }

    pub fn finish(&mut self) {
        if self.end_time.is_none() {
            self.end_time = Some(Instant::now());
        }
    }

    pub fn add_stage_time(&mut self, stage: Stage, dur: Duration) {
        self.stage_times.add(stage, dur);
    }

    /// Run `f` and charge its wall time to `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let t = Instant::now();
        let out = f();
        self.add_stage_time(stage, t.elapsed());
        out
    }

    pub fn elapsed(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_times_accumulate() {
        let mut st = StageTimes::default();
        st.add(Stage::Crypt, Duration::from_micros(10));
        st.add(Stage::Crypt, Duration::from_micros(5));
        st.add(Stage::Header, Duration::from_micros(1));
        assert_eq!(st.get(Stage::Crypt), Duration::from_micros(15));
        assert_eq!(st.total(), Duration::from_micros(16));
        assert!(st.has_all(&[Stage::Crypt, Stage::Header]));
        assert!(!st.has_all(&[Stage::KeySetup]));
    }

    #[test]
    fn finish_freezes_elapsed() {
        let mut t = TelemetryTimer::new();
        t.finish();
        let a = t.elapsed();
        t.finish();
        assert_eq!(a, t.elapsed());
    }

    #[test]
    fn stage_display_names() {
        assert_eq!(Stage::KeySetup.to_string(), "key_setup");
        assert_eq!(Stage::Finalize.to_string(), "finalize");
    }
}
