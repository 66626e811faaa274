use std::fmt;
use thiserror::Error;

/// Failures reported by context collaborators during traversal.
///
/// All variants are recoverable: the explorer contains them at the smallest
/// scope (one child entry, one element interaction) and carries on with the
/// remaining siblings and ancestors.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A listed child could not be entered, typically because the reference
    /// went stale between enumeration and entry.
    #[error("context unavailable: {0}")]
    Unavailable(String),
    /// A click or fill on a single element failed, e.g. the element was
    /// detached from the document.
    #[error("element interaction failed: {0}")]
    InteractionFailed(String),
    /// Any other collaborator failure.
    #[error("context operation failed: {0}")]
    Other(String),
}

impl ContextError {
    pub fn unavailable(msg: impl fmt::Display) -> Self {
        ContextError::Unavailable(msg.to_string())
    }

    pub fn interaction(msg: impl fmt::Display) -> Self {
        ContextError::InteractionFailed(msg.to_string())
    }

    pub fn other(msg: impl fmt::Display) -> Self {
        ContextError::Other(msg.to_string())
    }
}

/// Fatal traversal failures.
///
/// Budget exhaustion is deliberately absent: running out of budget is a
/// controlled stop reported through `TraversalResult::truncated`.
#[derive(Debug, Error)]
pub enum ExploreError {
    /// The id-derivation scheme produced an impossible collision, or an
    /// entered context could not be exited. Either way the bookkeeping can
    /// no longer be trusted, so the whole run stops.
    #[error("traversal invariant violated: {0}")]
    InvariantViolation(String),
}
