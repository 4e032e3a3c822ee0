//! Rolling frame-rate from host-reported frame deltas

use super::ring_buffer::RingBuffer;
use std::time::Duration;

#[derive(Debug)]
pub struct FrameTimer {
    frame_times: RingBuffer<Duration>,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            frame_times: RingBuffer::new(capacity),
        }
    }

    pub fn record(&mut self, frame_time: Duration) {
        self.frame_times.push(frame_time);
    }

    pub fn fps(&self) -> f64 {
        let avg = self.frame_times.average();
        if avg.as_secs_f64() > 0.0 {
            1.0 / avg.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn frame_time_ms(&self) -> f64 {
        self.frame_times.average().as_secs_f64() * 1000.0
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_from_average_frame_time() {
        let mut timer = FrameTimer::new(4);
        assert_eq!(timer.fps(), 0.0);
        for _ in 0..4 {
            timer.record(Duration::from_millis(20));
        }
        assert!((timer.fps() - 50.0).abs() < 1e-9);
        assert!((timer.frame_time_ms() - 20.0).abs() < 1e-9);
    }
}
