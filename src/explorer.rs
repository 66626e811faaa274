use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::actions::ActionPerformer;
use crate::budget::TraversalBudget;
use crate::collector::{ArtifactCollector, ArtifactLedger};
use crate::context::BrowsingContext;
use crate::errors::ExploreError;
use crate::registry::VisitedRegistry;
use crate::types::{ContextId, TraversalResult};

/// Timing tunables for one explorer instance.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// How long to wait for a just-entered context to finish materializing.
    pub ready_timeout: Duration,
    /// Poll interval while waiting for readiness.
    pub poll_interval: Duration,
    /// Pause after action probing so the probed content can settle.
    pub settle_delay: Duration,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            ready_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_millis(150),
        }
    }
}

/// Extra children() re-scans allowed per context after action probing.
/// Probing can keep spawning content indefinitely; two re-scans is enough
/// for honest reveals without oscillating on adversarial pages.
const MAX_RESCANS: usize = 2;

/// Bookkeeping owned by exactly one `explore` call, discarded afterwards.
/// Nothing here survives between runs or is shared across sessions.
struct TraversalState {
    visited: VisitedRegistry,
    ledger: ArtifactLedger,
    /// Stable discovery index -> derived id, seeded with the root. Children
    /// are addressed through this arena instead of live handles, so a
    /// context the environment re-materializes (or reaches again through a
    /// back-edge) resolves to the id it was first discovered under.
    arena: HashMap<usize, ContextId>,
    steps: usize,
    started: Instant,
    truncated: bool,
}

impl TraversalState {
    fn new() -> Self {
        let mut arena = HashMap::new();
        arena.insert(ContextId::ROOT_INDEX, ContextId::root());
        TraversalState {
            visited: VisitedRegistry::new(),
            ledger: ArtifactLedger::new(),
            arena,
            steps: 0,
            started: Instant::now(),
            truncated: false,
        }
    }
}

/// Depth-first explorer for graphs of nested browsing contexts.
///
/// The shape of the graph is unknown up front, is revealed only by entering
/// contexts and probing their controls, and may mutate while being probed.
/// The explorer visits every reachable context exactly once, collects
/// artifacts through its [`ArtifactCollector`], triggers mutation through
/// its [`ActionPerformer`], and stays within the caller's
/// [`TraversalBudget`].
///
/// One explorer can serve any number of sequential runs; all per-run state
/// lives in the `explore` call itself.
pub struct ContextGraphExplorer {
    collector: ArtifactCollector,
    performer: ActionPerformer,
    config: ExplorerConfig,
}

impl ContextGraphExplorer {
    pub fn new(
        collector: ArtifactCollector,
        performer: ActionPerformer,
        config: ExplorerConfig,
    ) -> Self {
        ContextGraphExplorer {
            collector,
            performer,
            config,
        }
    }

    /// Explore the graph reachable from `root` and return everything found.
    ///
    /// Always comes back with a [`TraversalResult`] under partial failure;
    /// per-context problems are contained and logged. The only error case
    /// is a broken traversal invariant, which means the bookkeeping itself
    /// can no longer be trusted.
    pub async fn explore(
        &self,
        root: &mut (dyn BrowsingContext + Send),
        budget: TraversalBudget,
    ) -> Result<TraversalResult, ExploreError> {
        let mut state = TraversalState::new();

        if let Some(dim) = budget.exceeded(state.steps, 0, state.started.elapsed()) {
            info!("Budget ({}) exhausted before entering the root context", dim);
            state.truncated = true;
        } else {
            self.visit(root, ContextId::root(), 0, budget, &mut state)
                .await?;
        }

        let result = TraversalResult {
            visited_count: state.visited.len(),
            truncated: state.truncated,
            artifacts: state.ledger.into_artifacts(),
        };
        info!(
            "Traversal finished: {} context(s) visited, {} artifact(s), truncated: {}",
            result.visited_count,
            result.artifacts.len(),
            result.truncated
        );
        Ok(result)
    }

    /// Visit the context the cursor currently points at. The caller is
    /// responsible for the enter/exit pairing around this call.
    fn visit<'a>(
        &'a self,
        ctx: &'a mut (dyn BrowsingContext + Send),
        id: ContextId,
        depth: usize,
        budget: TraversalBudget,
        state: &'a mut TraversalState,
    ) -> Pin<Box<dyn Future<Output = Result<(), ExploreError>> + Send + 'a>> {
        Box::pin(async move {
            state.steps += 1;
            // Mark before enumerating children so a self-referential listing
            // resolves to an already-seen id instead of recursing forever.
            state.visited.mark_seen(&id);
            debug!("Visiting {} at depth {} (step {})", id, depth, state.steps);

            let added = self.collector.collect(ctx, &id, &mut state.ledger).await;
            if added > 0 {
                info!("Collected {} new artifact(s) in {}", added, id);
            }

            self.process_children(ctx, &id, depth, budget, state)
                .await?;

            let report = self.performer.perform_available_actions(ctx).await;
            if report.attempted() > 0 {
                debug!(
                    "Probed {}: {} click(s), {} form(s) submitted",
                    id, report.clicked, report.forms_submitted
                );
                self.settle().await;
            }

            // Probing may have spawned children that were not in the first
            // listing; pick them up with a bounded number of re-scans.
            for _ in 0..MAX_RESCANS {
                let fresh = self
                    .process_children(ctx, &id, depth, budget, state)
                    .await?;
                if fresh == 0 {
                    break;
                }
                let report = self.performer.perform_available_actions(ctx).await;
                if report.attempted() > 0 {
                    self.settle().await;
                }
            }

            Ok(())
        })
    }

    /// Enumerate the current context's children and recurse into every
    /// unvisited one, in discovery order. Returns how many children were
    /// actually entered.
    async fn process_children(
        &self,
        ctx: &mut (dyn BrowsingContext + Send),
        id: &ContextId,
        depth: usize,
        budget: TraversalBudget,
        state: &mut TraversalState,
    ) -> Result<usize, ExploreError> {
        let children = match ctx.children().await {
            Ok(children) => children,
            Err(e) => {
                warn!("Could not enumerate children of {}: {}", id, e);
                return Ok(0);
            }
        };

        // Two entries sharing a discovery index would derive the same id;
        // that breaks the identity scheme itself, not just this context.
        let mut indices = HashSet::new();
        for child in &children {
            if !indices.insert(child.index) {
                return Err(ExploreError::InvariantViolation(format!(
                    "children of {} report discovery index {} twice",
                    id, child.index
                )));
            }
        }

        let mut entered = 0;
        for child in &children {
            let child_id = match state.arena.get(&child.index) {
                Some(existing) => existing.clone(),
                None => {
                    let derived = id.child(child.index);
                    if state.visited.seen(&derived) {
                        return Err(ExploreError::InvariantViolation(format!(
                            "freshly derived id {} collides with a visited context",
                            derived
                        )));
                    }
                    state.arena.insert(child.index, derived.clone());
                    derived
                }
            };

            if state.visited.seen(&child_id) {
                debug!("Skipping {} (already visited)", child_id);
                continue;
            }

            if let Some(dim) = budget.exceeded(state.steps, depth + 1, state.started.elapsed()) {
                info!(
                    "Budget ({}) exhausted at {} with children pending; halting descent",
                    dim, id
                );
                state.truncated = true;
                break;
            }

            if let Err(e) = ctx.enter(child).await {
                warn!("Could not enter {}: {}", child_id, e);
                continue;
            }

            self.wait_ready(ctx, &child_id).await;

            // The recursive call may fail fatally, but the paired exit is
            // performed first on every path.
            let outcome = self
                .visit(&mut *ctx, child_id.clone(), depth + 1, budget, &mut *state)
                .await;
            if let Err(e) = ctx.exit().await {
                return Err(ExploreError::InvariantViolation(format!(
                    "could not exit {} back to {}: {}",
                    child_id, id, e
                )));
            }
            outcome?;
            entered += 1;
        }

        Ok(entered)
    }

    /// Bounded poll until the current context reports itself ready. A probe
    /// failure or timeout is not fatal; the context is simply taken as-is.
    async fn wait_ready(&self, ctx: &mut (dyn BrowsingContext + Send), id: &ContextId) {
        let deadline = Instant::now() + self.config.ready_timeout;
        loop {
            match ctx.is_ready().await {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => {
                    debug!("Readiness probe failed in {}: {}", id, e);
                    return;
                }
            }
            if Instant::now() >= deadline {
                debug!(
                    "{} not ready after {:?}, proceeding anyway",
                    id, self.config.ready_timeout
                );
                return;
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn settle(&self) {
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }
    }
}

impl Default for ContextGraphExplorer {
    fn default() -> Self {
        ContextGraphExplorer::new(
            ArtifactCollector::default(),
            ActionPerformer::default(),
            ExplorerConfig::default(),
        )
    }
}
