//! # framescout
#![allow(clippy::uninlined_format_args)]
//!
//! Exploration engine for nested browsing contexts (iframes, windows, or
//! anything else that nests), built for "treasure hunt" pages that scatter
//! pieces of a solution across a context graph whose shape is unknown up
//! front and mutates while being explored.
//!
//! The engine visits every reachable context exactly once, survives
//! cyclic and self-referential graphs, collects each artifact once no
//! matter how many contexts repeat it, pokes controls to make hidden
//! contexts appear, and terminates deterministically under an explicit
//! budget even when the graph does not.
//!
//! ## Structure
//!
//! The traversal core is driver-agnostic: it talks to the environment only
//! through the [`BrowsingContext`] and [`ElementRef`] collaborator traits.
//! The [`webdriver`] module ships an implementation over a live WebDriver
//! session that models browser windows as contexts; synthetic in-memory
//! graphs (see the integration tests) work just as well.
//!
//! ## Usage
//!
//! ```no_run
//! use framescout::{ContextGraphExplorer, SolutionAggregator, TraversalBudget, WindowSession};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut session =
//!     WindowSession::connect("http://localhost:4444", "https://hunt.example.com").await?;
//!
//! let explorer = ContextGraphExplorer::default();
//! let result = explorer.explore(&mut session, TraversalBudget::default()).await?;
//!
//! let token = SolutionAggregator::default().aggregate(&result.artifacts);
//! println!("{} ({} contexts visited)", token, result.visited_count);
//!
//! session.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Collection, probing, and aggregation are all configurable: selector
//! priorities via [`ArtifactSelector`], probing exclusions and the fill
//! placeholder via [`ActionPerformer`], timing via [`ExplorerConfig`], and
//! the final token format via [`AggregationStrategy`].

/// Generic probing of a context's actionable controls
pub mod actions;

/// Reduction of collected artifacts into a submission token
pub mod aggregator;

/// Termination limits for open-ended graphs
pub mod budget;

/// Artifact extraction with run-wide deduplication
pub mod collector;

/// Collaborator traits the traversal consumes
pub mod context;

/// Error taxonomy: recoverable collaborator failures vs. fatal invariants
pub mod errors;

/// Depth-first context-graph traversal
pub mod explorer;

/// Visitation bookkeeping over derived context ids
pub mod registry;

/// Core data types
pub mod types;

/// WebDriver-backed window contexts
pub mod webdriver;

pub use actions::{ActionPerformer, ActionReport};
pub use aggregator::{AggregationStrategy, DelimiterJoin, Initials, SolutionAggregator};
pub use budget::{BudgetDimension, TraversalBudget};
pub use collector::{ArtifactCollector, ArtifactLedger, ArtifactSelector, default_selectors};
pub use context::{BoxedElement, BrowsingContext, ElementRef};
pub use errors::{ContextError, ExploreError};
pub use explorer::{ContextGraphExplorer, ExplorerConfig};
pub use registry::VisitedRegistry;
pub use types::{Artifact, ChildRef, ContextId, TraversalResult};
pub use webdriver::WindowSession;
