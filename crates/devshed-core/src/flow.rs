//! Re-entrancy guard for interactive write flows.
//!
//! A selection flow that has fired a switch or update must ignore further
//! input until the write settles; re-entrant submissions are dropped, not
//! queued.

use std::sync::atomic::{AtomicBool, Ordering};

/// Single-submission gate a flow consults before starting a write.
#[derive(Debug, Default)]
pub struct SubmitGate {
    busy: AtomicBool,
}

impl SubmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate for one submission.
    ///
    /// Returns `None` while a previous submission is still in flight, in
    /// which case the caller drops the triggering input. The permit releases
    /// the gate on drop, whether the write succeeded or failed.
    pub fn try_acquire(&self) -> Option<SubmitPermit<'_>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(SubmitPermit { gate: self })
    }

    /// Whether a submission is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Live claim on a [`SubmitGate`].
#[derive(Debug)]
pub struct SubmitPermit<'a> {
    gate: &'a SubmitGate,
}

impl Drop for SubmitPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
