use std::collections::HashSet;

use crate::types::ContextId;

/// Tracks which derived context ids have been seen during one traversal.
///
/// Because ids are derived from graph position, a context that the
/// environment tears down and re-renders maps back to the same id and is
/// correctly reported as already seen.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    seen: HashSet<ContextId>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, id: &ContextId) -> bool {
        self.seen.contains(id)
    }

    /// Record `id` as seen. Idempotent; returns false when it was already
    /// present.
    pub fn mark_seen(&mut self, id: &ContextId) -> bool {
        self.seen.insert(id.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;
