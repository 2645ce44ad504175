//! Per-phase tally of assertion outcomes

use shared::{AssertionCall, AssertionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Passed,
    Failed,
    Skipped,
    TaskFailed,
}

/// Outcomes produced by one phase (simulate or validate) of one scenario.
///
/// An empty set never passes: a phase that checked nothing proves nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    outcomes: Vec<Outcome>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_call(&mut self, call: &AssertionCall) {
        self.outcomes.push(match call.status() {
            AssertionStatus::Passed => Outcome::Passed,
            AssertionStatus::Failed => Outcome::Failed,
            AssertionStatus::Skipped => Outcome::Skipped,
        });
    }

    /// Record an executor that errored instead of producing assertions
    pub fn add_task_failure(&mut self) {
        self.outcomes.push(Outcome::TaskFailed);
    }

    /// True iff at least one outcome was recorded and none failed
    pub fn all(&self) -> bool {
        !self.outcomes.is_empty()
            && self
                .outcomes
                .iter()
                .all(|outcome| matches!(outcome, Outcome::Passed | Outcome::Skipped))
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.count(Outcome::Passed)
    }

    pub fn skipped(&self) -> usize {
        self.count(Outcome::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::Failed) + self.count(Outcome::TaskFailed)
    }

    fn count(&self, wanted: Outcome) -> usize {
        self.outcomes.iter().filter(|outcome| **outcome == wanted).count()
    }
}
