//! Kiln Metrics - frame and phase instrumentation
//!
//! Counters and timers the editor shows in its status line: frames per
//! second, fixed steps taken, script failures, and time spent in the
//! script and physics phases of each step.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! Without `metrics`, every type below is a zero-sized stub and
//! instrumentation compiles away.

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod frame_timer;
#[cfg(feature = "metrics")]
mod phase_profiler;
#[cfg(feature = "metrics")]
mod ring_buffer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
#[cfg(feature = "metrics")]
pub use phase_profiler::PhaseProfiler;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct FrameTimer;

#[cfg(not(feature = "metrics"))]
impl FrameTimer {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn record(&mut self, _frame_time: std::time::Duration) {}
    pub fn fps(&self) -> f64 { 0.0 }
    pub fn frame_time_ms(&self) -> f64 { 0.0 }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &'static str, _value: u64) {}
    pub fn get(&self, _name: &'static str) -> u64 { 0 }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct PhaseProfiler;

#[cfg(not(feature = "metrics"))]
impl PhaseProfiler {
    pub fn new() -> Self { Self }
    pub fn time<F, R>(&mut self, _phase: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn total(&self, _phase: &'static str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn reset(&mut self) {}
}
