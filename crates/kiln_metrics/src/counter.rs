//! Named event counters

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Counter {
    counters: HashMap<&'static str, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, name: &'static str, value: u64) {
        *self.counters.entry(name).or_insert(0) += value;
    }

    pub fn get(&self, name: &'static str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn reset_all(&mut self) {
        self.counters.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&&'static str, &u64)> {
        self.counters.iter()
    }
}
