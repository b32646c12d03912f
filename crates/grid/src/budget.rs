use std::sync::atomic::{AtomicUsize, Ordering};

use ghostplan_core::StepFailure;

/// Cap on how many successors may be generated before a reset.
///
/// Shared through `&self` so a game can be stepped from an immutable
/// reference. Once the cap is reached every further request fails until
/// [`SuccessorBudget::reset`] is called, typically once per decision.
#[derive(Debug, Default)]
pub struct SuccessorBudget {
    limit: Option<usize>,
    used: AtomicUsize,
}

impl SuccessorBudget {
    /// A budget that never runs out (still counts usage).
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// A budget allowing `limit` successors between resets.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            used: AtomicUsize::new(0),
        }
    }

    /// Claim one successor.
    pub fn try_consume(&self) -> Result<(), StepFailure> {
        match self.limit {
            None => {
                self.used.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Some(limit) => self
                .used
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |used| {
                    (used < limit).then_some(used + 1)
                })
                .map(|_| ())
                .map_err(|_| StepFailure),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Successors generated since the last reset.
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    /// Successors left before the budget fails, `None` if unlimited.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.used()))
    }

    pub fn reset(&self) {
        self.used.store(0, Ordering::Relaxed);
    }
}

impl Clone for SuccessorBudget {
    fn clone(&self) -> Self {
        Self {
            limit: self.limit,
            used: AtomicUsize::new(self.used()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limited_budget() {
        let budget = SuccessorBudget::new(2);
        assert_eq!(budget.try_consume(), Ok(()));
        assert_eq!(budget.try_consume(), Ok(()));
        assert_eq!(budget.try_consume(), Err(StepFailure));
        assert_eq!(budget.used(), 2);
        assert_eq!(budget.remaining(), Some(0));

        budget.reset();
        assert_eq!(budget.remaining(), Some(2));
        assert_eq!(budget.try_consume(), Ok(()));
    }

    #[test]
    fn test_unlimited_budget_counts() {
        let budget = SuccessorBudget::unlimited();
        for _ in 0..100 {
            assert!(budget.try_consume().is_ok());
        }
        assert_eq!(budget.used(), 100);
        assert_eq!(budget.remaining(), None);
    }

    #[test]
    fn test_zero_budget_always_fails() {
        let budget = SuccessorBudget::new(0);
        assert_eq!(budget.try_consume(), Err(StepFailure));
    }
}
