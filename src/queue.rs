//! Command Queue
//!
//! Labels of pipelined commands whose replies have not been read yet, in
//! the order the commands were written.

use crossbeam::queue::SegQueue;

/// FIFO of pending command labels
///
/// Lock-free and unbounded: `offer` never blocks or fails, `poll` returns
/// immediately.
#[derive(Debug, Default)]
pub struct CommandQueue {
    labels: SegQueue<String>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label
    pub fn offer(&self, label: impl Into<String>) {
        self.labels.push(label.into());
    }

    /// Take the oldest label, if any
    pub fn poll(&self) -> Option<String> {
        self.labels.pop()
    }

    /// Number of labels still waiting for a reply
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Discard every pending label, returning how many were dropped
    pub fn clear(&self) -> usize {
        let mut dropped = 0;
        while self.labels.pop().is_some() {
            dropped += 1;
        }
        dropped
    }
}
