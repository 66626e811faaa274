use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a browsing context, derived from its position in
/// the context graph rather than from any live handle.
///
/// The root context is `"root"`; a child's id is its parent's id plus the
/// child's discovery index. A context that disappears and is re-rendered by
/// the environment maps back to the same id, so the traversal treats it as
/// already visited instead of re-processing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(String);

impl ContextId {
    /// Discovery index every collaborator must report for the entry context.
    pub const ROOT_INDEX: usize = 0;

    /// Id of the entry context.
    pub fn root() -> Self {
        ContextId("root".to_string())
    }

    /// Derive the id of the child at `discovery_index` under this context.
    pub fn child(&self, discovery_index: usize) -> Self {
        ContextId(format!("{}/{}", self.0, discovery_index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a not-yet-entered child context, as reported by the host
/// environment during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    /// Discovery index assigned when the session first surfaced this
    /// context; stable across re-enumerations and re-materializations.
    pub index: usize,
    /// Optional human-readable hint (frame name, window title).
    pub label: Option<String>,
}

impl ChildRef {
    pub fn new(index: usize) -> Self {
        ChildRef { index, label: None }
    }

    pub fn with_label(index: usize, label: impl Into<String>) -> Self {
        ChildRef {
            index,
            label: Some(label.into()),
        }
    }
}

/// A discrete piece of information recovered from one context.
///
/// Uniqueness is by `payload` across a whole traversal run; the same value
/// appearing in several contexts is recorded once, from its first origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// The recovered value.
    pub payload: String,
    /// Context the value was first collected from.
    pub origin: ContextId,
    /// Position in first-collection order, starting at 0.
    pub order: usize,
}

/// Outcome of one traversal run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Collected artifacts in first-collection order.
    pub artifacts: Vec<Artifact>,
    /// Number of distinct contexts visited, the root included.
    pub visited_count: usize,
    /// True when any budget dimension halted descent before the graph was
    /// exhausted; the artifact list may be incomplete.
    pub truncated: bool,
}

impl TraversalResult {
    /// Artifact payloads in first-collection order.
    pub fn payloads(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.payload.as_str()).collect()
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
