//! Accumulated wall time per named phase of the fixed step

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct PhaseProfiler {
    timings: HashMap<&'static str, Duration>,
}

impl PhaseProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time<F, R>(&mut self, phase: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        *self.timings.entry(phase).or_insert(Duration::ZERO) += start.elapsed();
        result
    }

    pub fn total(&self, phase: &'static str) -> Duration {
        self.timings.get(phase).copied().unwrap_or(Duration::ZERO)
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }
}
