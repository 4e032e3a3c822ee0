//! Fixed-step simulation time
//!
//! Variable frame deltas accumulate into a budget that is drained one fixed
//! step at a time. The remainder carries over to the next frame, so the
//! total number of steps depends only on the summed frame time, never on
//! how it was chunked. All arithmetic is in whole nanoseconds.

use std::time::Duration;

/// Default simulation tick rate (60 Hz)
pub const TICK_RATE_HZ: u32 = 60;

/// Accumulator that converts frame time into fixed steps.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: Duration,
    accumulated: Duration,
    tick_count: u64,
}

impl FixedStepClock {
    pub fn new(step: Duration) -> Self {
        debug_assert!(!step.is_zero(), "fixed step must be non-zero");
        Self {
            step,
            accumulated: Duration::ZERO,
            tick_count: 0,
        }
    }

    /// Clock stepping `hz` times per simulated second.
    pub fn from_hz(hz: u32) -> Self {
        Self::new(Duration::from_nanos(1_000_000_000 / u64::from(hz.max(1))))
    }

    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Step length in seconds, as handed to scripts and the simulation.
    #[inline]
    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Add a frame's wall-clock delta to the budget.
    pub fn accumulate(&mut self, frame_delta: Duration) {
        self.accumulated += frame_delta;
    }

    /// Consume one step from the budget if it covers one.
    pub fn next_step(&mut self) -> bool {
        if self.accumulated < self.step {
            return false;
        }
        self.accumulated -= self.step;
        self.tick_count += 1;
        true
    }

    /// Budget left over after the last consumed step.
    #[inline]
    pub fn remainder(&self) -> Duration {
        self.accumulated
    }

    /// Steps consumed since creation.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Total simulated time consumed by steps. Saturates at `u64::MAX`
    /// nanoseconds.
    pub fn total_time(&self) -> Duration {
        let step_nanos = u64::try_from(self.step.as_nanos()).unwrap_or(u64::MAX);
        Duration::from_nanos(step_nanos.saturating_mul(self.tick_count))
    }
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::from_hz(TICK_RATE_HZ)
    }
}
