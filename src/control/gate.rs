//! Poll-loop gating: suspension and tick-overlap protection for one role.

use std::sync::atomic::{AtomicBool, Ordering};

/// Per-role gate with two independent bits: whether the scheduled loop is
/// active at all, and whether a cycle is currently in flight. A tick that
/// fires while the previous cycle is still running is skipped, never queued.
#[derive(Debug)]
pub struct PollGate {
    active: AtomicBool,
    busy: AtomicBool,
}

impl PollGate {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Resume the loop. Returns true if it was suspended.
    pub fn resume(&self) -> bool {
        !self.active.swap(true, Ordering::SeqCst)
    }

    /// Suspend the loop. Returns true if it was active.
    pub fn suspend(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }

    /// Claim the single cycle slot. Returns false if a cycle is in flight.
    pub fn try_acquire(&self) -> bool {
        !self.busy.swap(true, Ordering::SeqCst)
    }

    pub fn release(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl Default for PollGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_slot_admits_one_cycle() {
        let gate = PollGate::new();
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        gate.release();
        assert!(gate.try_acquire());
    }

    #[test]
    fn suspend_and_resume_report_transitions() {
        let gate = PollGate::new();
        assert!(gate.is_active());
        assert!(gate.suspend());
        assert!(!gate.suspend());
        assert!(!gate.is_active());
        assert!(gate.resume());
        assert!(!gate.resume());
    }
}
