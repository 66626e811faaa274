use crate::types::Artifact;

/// Rule for reducing collected artifacts into a single submission token.
///
/// Kept behind a trait object so the reduction can be swapped per target
/// puzzle without touching the traversal.
pub trait AggregationStrategy: Send + Sync {
    fn aggregate(&self, artifacts: &[Artifact]) -> String;
}

/// Joins payloads in first-collection order with a fixed delimiter.
#[derive(Debug, Clone)]
pub struct DelimiterJoin {
    delimiter: String,
}

impl DelimiterJoin {
    pub fn new(delimiter: impl Into<String>) -> Self {
        DelimiterJoin {
            delimiter: delimiter.into(),
        }
    }
}

impl Default for DelimiterJoin {
    fn default() -> Self {
        DelimiterJoin::new("-")
    }
}

impl AggregationStrategy for DelimiterJoin {
    fn aggregate(&self, artifacts: &[Artifact]) -> String {
        artifacts
            .iter()
            .map(|a| a.payload.as_str())
            .collect::<Vec<_>>()
            .join(&self.delimiter)
    }
}

/// Concatenates the first character of each payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Initials;

impl AggregationStrategy for Initials {
    fn aggregate(&self, artifacts: &[Artifact]) -> String {
        artifacts
            .iter()
            .filter_map(|a| a.payload.chars().next())
            .collect()
    }
}

/// Reduces a traversal's artifacts into the final submission token.
pub struct SolutionAggregator {
    strategy: Box<dyn AggregationStrategy>,
}

impl SolutionAggregator {
    pub fn new(strategy: Box<dyn AggregationStrategy>) -> Self {
        SolutionAggregator { strategy }
    }

    pub fn aggregate(&self, artifacts: &[Artifact]) -> String {
        self.strategy.aggregate(artifacts)
    }
}

impl Default for SolutionAggregator {
    fn default() -> Self {
        SolutionAggregator::new(Box::new(DelimiterJoin::default()))
    }
}

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod aggregator_test;
