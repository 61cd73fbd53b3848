//! Correlation ID generation.

use std::sync::{Mutex, PoisonError};

use ulid::{Generator, Ulid};

/// Generator for per-call correlation IDs.
///
/// IDs are guaranteed unique within one workerize instance and are lexically
/// sortable by creation time, which keeps message logs readable. Ordering is
/// a debugging aid only; correctness relies on uniqueness alone.
pub struct CorrelationIds {
    generator: Mutex<Generator>,
}

impl CorrelationIds {
    pub fn new() -> Self {
        Self {
            generator: Mutex::new(Generator::new()),
        }
    }

    /// Produce the next ID.
    ///
    /// Monotonic within a millisecond; should the monotonic counter ever
    /// overflow, falls back to a fresh random ULID, which is still unique.
    pub fn next(&self) -> Ulid {
        let mut generator = self
            .generator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        generator.generate().unwrap_or_else(|_| Ulid::new())
    }
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::new()
    }
}
