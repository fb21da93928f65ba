//! Injected sources of ids and randomness.
//!
//! Production code uses the clock and a seeded-from-entropy RNG; tests swap
//! in [`SequentialIds`] and [`FixedPicker`] so outcomes are reproducible.

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::models::LOCAL_PREFIX;

/// Produces ids for locally created quotes.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> String;
}

/// `local-<unix millis>`, bumped when two ids land on the same millisecond.
#[derive(Debug, Default)]
pub struct ClockIds {
    last: i64,
}

impl IdGenerator for ClockIds {
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last = if now > self.last { now } else { self.last + 1 };
        format!("{}{}", LOCAL_PREFIX, self.last)
    }
}

/// `local-<n>` counting up from a starting value.
#[derive(Debug)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1000)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let n = self.next;
        self.next += 1;
        format!("{}{}", LOCAL_PREFIX, n)
    }
}

/// Chooses an index into a non-empty candidate list.
pub trait QuotePicker: Send {
    /// `len` is always at least 1.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform choice over the candidates.
#[derive(Debug)]
pub struct RandomPicker {
    rng: SmallRng,
}

impl RandomPicker {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl QuotePicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Always picks the same position, clamped to the candidate count.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl QuotePicker for FixedPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}
