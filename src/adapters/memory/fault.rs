//! Fault injection for in-memory adapters

use std::sync::atomic::{AtomicUsize, Ordering};

const ALWAYS: usize = usize::MAX;

/// Makes an in-memory adapter fail its next operations
///
/// Injected failures surface as transient connection errors, so they go
/// through the same retry path as a real network fault.
#[derive(Debug, Default)]
pub struct FaultInjector {
    remaining: AtomicUsize,
}

impl FaultInjector {
    /// Fail the next `count` operations
    pub fn fail_next(&self, count: usize) {
        self.remaining.store(count, Ordering::SeqCst);
    }

    /// Fail every operation until [`recover`](Self::recover) is called
    pub fn fail_always(&self) {
        self.remaining.store(ALWAYS, Ordering::SeqCst);
    }

    /// Stop failing
    pub fn recover(&self) {
        self.remaining.store(0, Ordering::SeqCst);
    }

    /// Consumes one pending failure, returning whether this operation fails
    pub(crate) fn trip(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                ALWAYS => Some(ALWAYS),
                n => Some(n - 1),
            })
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_faults_by_default() {
        let faults = FaultInjector::default();
        assert!(!faults.trip());
    }

    #[test]
    fn test_fail_next_counts_down() {
        let faults = FaultInjector::default();
        faults.fail_next(2);
        assert!(faults.trip());
        assert!(faults.trip());
        assert!(!faults.trip());
    }

    #[test]
    fn test_fail_always_until_recover() {
        let faults = FaultInjector::default();
        faults.fail_always();
        for _ in 0..5 {
            assert!(faults.trip());
        }
        faults.recover();
        assert!(!faults.trip());
    }
}
