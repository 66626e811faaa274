use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Immutable limits guaranteeing that a traversal terminates even on an
/// open-ended, externally-mutated context graph.
///
/// The explorer consults the budget before every context entry; exceeding
/// any dimension halts further descent while already-entered contexts still
/// unwind cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalBudget {
    /// Maximum number of context entries, the root included.
    pub max_steps: usize,
    /// Maximum nesting depth; the root sits at depth 0.
    pub max_depth: usize,
    /// Wall-clock ceiling for the whole run.
    pub max_duration: Duration,
}

/// The budget dimension that halted descent, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDimension {
    Steps,
    Depth,
    Duration,
}

impl fmt::Display for BudgetDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetDimension::Steps => write!(f, "steps"),
            BudgetDimension::Depth => write!(f, "depth"),
            BudgetDimension::Duration => write!(f, "duration"),
        }
    }
}

impl TraversalBudget {
    pub fn new(max_steps: usize, max_depth: usize, max_duration: Duration) -> Self {
        TraversalBudget {
            max_steps,
            max_depth,
            max_duration,
        }
    }

    /// Check whether entering one more context is still allowed, given the
    /// steps consumed so far, the depth the next context would occupy, and
    /// the elapsed wall-clock time. Returns the violated dimension, if any.
    pub fn exceeded(
        &self,
        steps_taken: usize,
        next_depth: usize,
        elapsed: Duration,
    ) -> Option<BudgetDimension> {
        if steps_taken >= self.max_steps {
            Some(BudgetDimension::Steps)
        } else if next_depth > self.max_depth {
            Some(BudgetDimension::Depth)
        } else if elapsed >= self.max_duration {
            Some(BudgetDimension::Duration)
        } else {
            None
        }
    }
}

impl Default for TraversalBudget {
    /// Generous limits suitable for real hunts: 256 contexts, 16 levels,
    /// two minutes.
    fn default() -> Self {
        TraversalBudget {
            max_steps: 256,
            max_depth: 16,
            max_duration: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
#[path = "budget_test.rs"]
mod budget_test;
