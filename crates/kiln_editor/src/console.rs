//! Bounded log of user-visible editor messages.

use std::collections::VecDeque;

pub const CONSOLE_CAPACITY: usize = 1000;

/// Oldest lines are dropped once the console is full. Every line is also
/// emitted through `tracing`.
#[derive(Debug)]
pub struct Console {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Console {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(CONSOLE_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "kiln_editor::console", "{message}");
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(message);
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(CONSOLE_CAPACITY)
    }
}
