//! Rolling sample history: fixed-capacity ring buffer
//!
//! Backed by an array so the control loop never allocates once running.
//! Oldest sample is evicted on overflow.

use crate::HISTORY_CAPACITY;

/// One calibrated reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    /// Monotonic clock value (seconds)
    pub timestamp: f64,
    /// Calibrated weight (kg)
    pub weight: f64,
}

impl Sample {
    pub fn new(timestamp: f64, weight: f64) -> Self {
        Self { timestamp, weight }
    }
}

/// Index-addressed ring buffer of the last `HISTORY_CAPACITY` samples
#[derive(Debug, Clone)]
pub struct RollingHistory {
    slots: [Sample; HISTORY_CAPACITY],
    /// Index the next sample is written to
    head: usize,
    len: usize,
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingHistory {
    pub fn new() -> Self {
        Self {
            slots: [Sample::default(); HISTORY_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.slots[self.head] = sample;
        self.head = (self.head + 1) % HISTORY_CAPACITY;
        if self.len < HISTORY_CAPACITY {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }

    /// Sample `age` steps back from the newest (0 = newest)
    fn back(&self, age: usize) -> Option<Sample> {
        if age >= self.len {
            return None;
        }
        let index = (self.head + HISTORY_CAPACITY - 1 - age) % HISTORY_CAPACITY;
        Some(self.slots[index])
    }

    pub fn latest(&self) -> Option<Sample> {
        self.back(0)
    }

    /// The sample immediately before the newest one
    pub fn previous(&self) -> Option<Sample> {
        self.back(1)
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = Sample> + '_ {
        let start = (self.head + HISTORY_CAPACITY - self.len) % HISTORY_CAPACITY;
        (0..self.len).map(move |i| self.slots[(start + i) % HISTORY_CAPACITY])
    }

    /// Mean weight over everything held
    pub fn mean_weight(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        let sum: f64 = self.iter().map(|s| s.weight).sum();
        Some(sum / self.len as f64)
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
