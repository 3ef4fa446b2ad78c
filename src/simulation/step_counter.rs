//! Caller-owned step counter
//!
//! The generator never reads or advances shared state; the export trigger owns
//! one of these and claims exactly one index per triggered step. The counter
//! lives for the process lifetime only and restarts from its start value.

use std::sync::atomic::{AtomicU64, Ordering};

use super::error::{SimulationError, SimulationResult};

/// Monotonically increasing step index
///
/// Indices run from `start` up to and including `u64::MAX`; once the last one
/// is claimed the counter is exhausted and never wraps back to zero.
#[derive(Debug, Default)]
pub struct StepCounter {
    start: u64,
    claimed: AtomicU64,
}

impl StepCounter {
    /// Create a counter whose first claimed step is `start`
    pub fn new(start: u64) -> Self {
        Self { start, claimed: AtomicU64::new(0) }
    }

    /// Claim the current step index and advance by one
    ///
    /// Each call returns a distinct, strictly larger index, also under
    /// concurrent callers.
    pub fn next_step(&self) -> SimulationResult<u64> {
        let start = self.start;
        self.claimed
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |claimed| {
                start.checked_add(claimed)?;
                claimed.checked_add(1)
            })
            .map(|claimed| start + claimed)
            .map_err(|_| {
                SimulationError::StepCounterError(format!("step indices exhausted after starting at {}", start))
            })
    }

    /// The index the next call to [`Self::next_step`] would return, `None` once exhausted
    pub fn peek(&self) -> Option<u64> {
        self.start.checked_add(self.claimed.load(Ordering::Relaxed))
    }

    /// Number of steps claimed so far
    pub fn claimed(&self) -> u64 {
        self.claimed.load(Ordering::Relaxed)
    }

    /// Restart the counter at `start`
    pub fn reset(&mut self, start: u64) {
        self.start = start;
        *self.claimed.get_mut() = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_step_advances_once() {
        let counter = StepCounter::new(5);
        assert_eq!(counter.peek(), Some(5));
        assert_eq!(counter.next_step().unwrap(), 5);
        assert_eq!(counter.next_step().unwrap(), 6);
        assert_eq!(counter.peek(), Some(7));
        assert_eq!(counter.claimed(), 2);
    }

    #[test]
    fn test_reset() {
        let mut counter = StepCounter::default();
        counter.next_step().unwrap();
        counter.next_step().unwrap();
        counter.reset(0);
        assert_eq!(counter.next_step().unwrap(), 0);
    }

    #[test]
    fn test_last_index_is_claimable_once() {
        let counter = StepCounter::new(u64::MAX - 1);
        assert_eq!(counter.next_step().unwrap(), u64::MAX - 1);
        assert_eq!(counter.next_step().unwrap(), u64::MAX);
        assert_eq!(counter.peek(), None);

        let err = counter.next_step().unwrap_err();
        assert!(matches!(err, SimulationError::StepCounterError(_)));
        assert_eq!(err.category(), "Step Counter");

        // Exhaustion does not advance the counter any further
        assert!(counter.next_step().is_err());
        assert_eq!(counter.claimed(), 2);
    }
}
