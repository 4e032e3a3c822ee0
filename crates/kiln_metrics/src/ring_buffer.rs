//! Fixed-capacity sample window for rolling averages

use std::time::Duration;

#[derive(Debug)]
pub struct RingBuffer<T> {
    samples: Vec<T>,
    capacity: usize,
    index: usize,
}

impl<T: Copy> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            index: 0,
        }
    }

    /// Store a sample, overwriting the oldest once full.
    pub fn push(&mut self, sample: T) {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.index] = sample;
        }
        self.index = (self.index + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl RingBuffer<Duration> {
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.samples.iter().sum();
        sum / self.samples.len() as u32
    }
}
