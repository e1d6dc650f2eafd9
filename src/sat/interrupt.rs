#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Cooperative cancellation for long searches.
//!
//! The search polls its `Interrupt` once per step. Polling has no effect on
//! the result of a search that is allowed to finish; a triggered interrupt
//! ends the search with `SolveOutcome::Aborted`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

impl Interrupt {
    /// An interrupt that never fires.
    #[must_use]
    pub fn never() -> Self {
        Self::default()
    }

    /// Fires once `flag` is set, typically from another thread.
    #[must_use]
    pub fn with_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.flag = Some(flag);
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fires `timeout` after this call.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
