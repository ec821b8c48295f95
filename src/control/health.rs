//! Per-node health flag with the two-state transition rules.
//!
//! Owned exclusively by the local controller of the node it describes; a
//! supervisor only ever sees it through the temperature query result.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Degraded,
}

/// Atomic Healthy/Degraded flag. Starts Healthy. Degrades on any sensor,
/// command, or validation failure; restored only by a fully successful
/// proportional command sequence or an explicit supervisor resume.
#[derive(Debug)]
pub struct HealthFlag {
    healthy: AtomicBool,
}

impl HealthFlag {
    pub fn new() -> Self {
        Self { healthy: AtomicBool::new(true) }
    }

    pub fn state(&self) -> HealthState {
        if self.is_healthy() {
            HealthState::Healthy
        } else {
            HealthState::Degraded
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    pub fn degrade(&self) {
        self.healthy.store(false, Ordering::SeqCst);
    }

    pub fn restore(&self) {
        self.healthy.store(true, Ordering::SeqCst);
    }
}

impl Default for HealthFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_healthy_and_transitions() {
        let flag = HealthFlag::new();
        assert_eq!(flag.state(), HealthState::Healthy);

        flag.degrade();
        assert_eq!(flag.state(), HealthState::Degraded);
        flag.degrade();
        assert_eq!(flag.state(), HealthState::Degraded);

        flag.restore();
        assert_eq!(flag.state(), HealthState::Healthy);
    }
}
