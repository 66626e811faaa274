use std::collections::HashSet;
use tracing::{debug, warn};

use crate::context::{BoxedElement, BrowsingContext};
use crate::errors::ContextError;
use crate::types::{Artifact, ContextId};

/// One way of locating artifact elements inside a context.
#[derive(Debug, Clone)]
pub struct ArtifactSelector {
    /// CSS selector tried against the context.
    pub css: String,
    /// Attribute consulted when a matching element has no text content.
    pub fallback_attr: Option<String>,
}

impl ArtifactSelector {
    pub fn css(selector: impl Into<String>) -> Self {
        ArtifactSelector {
            css: selector.into(),
            fallback_attr: None,
        }
    }

    pub fn with_fallback_attr(selector: impl Into<String>, attr: impl Into<String>) -> Self {
        ArtifactSelector {
            css: selector.into(),
            fallback_attr: Some(attr.into()),
        }
    }
}

/// Default strategy order: the explicit marker class first, then the data
/// attribute convention.
pub fn default_selectors() -> Vec<ArtifactSelector> {
    vec![
        ArtifactSelector::css(".artifact"),
        ArtifactSelector::with_fallback_attr("[data-artifact]", "data-artifact"),
    ]
}

/// Run-wide artifact bookkeeping: payload dedup plus first-collection order.
///
/// Owned by one traversal run and discarded with it; never shared between
/// concurrent runs.
#[derive(Debug, Default)]
pub struct ArtifactLedger {
    payloads: HashSet<String>,
    artifacts: Vec<Artifact>,
}

impl ArtifactLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a payload collected in `origin`. Returns false when the
    /// payload was already present; the ledger never shrinks and existing
    /// entries keep their order.
    pub fn record(&mut self, payload: String, origin: &ContextId) -> bool {
        if !self.payloads.insert(payload.clone()) {
            // Same value legitimately shows up in several contexts; keep
            // the first origin but log this one for traceability.
            debug!("Duplicate artifact '{}' also present in {}", payload, origin);
            return false;
        }
        let order = self.artifacts.len();
        self.artifacts.push(Artifact {
            payload,
            origin: origin.clone(),
            order,
        });
        true
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Extracts artifacts from a single context.
///
/// Selectors are tried in priority order; the first one matching any
/// elements wins and each matching element yields at most one artifact.
#[derive(Debug, Clone)]
pub struct ArtifactCollector {
    selectors: Vec<ArtifactSelector>,
}

impl ArtifactCollector {
    pub fn new(selectors: Vec<ArtifactSelector>) -> Self {
        ArtifactCollector { selectors }
    }

    /// Collect from the current context into `ledger`, returning how many
    /// genuinely new artifacts were recorded.
    ///
    /// Element failures are contained per element, selector failures per
    /// selector; this method itself never fails the traversal.
    pub async fn collect(
        &self,
        ctx: &mut (dyn BrowsingContext + Send),
        origin: &ContextId,
        ledger: &mut ArtifactLedger,
    ) -> usize {
        for selector in &self.selectors {
            let elements = match ctx.find_artifact_elements(&selector.css).await {
                Ok(elements) => elements,
                Err(e) => {
                    warn!("Artifact query '{}' failed in {}: {}", selector.css, origin, e);
                    continue;
                }
            };

            if elements.is_empty() {
                continue;
            }

            debug!(
                "Selector '{}' matched {} element(s) in {}",
                selector.css,
                elements.len(),
                origin
            );

            let mut added = 0;
            for element in &elements {
                match self.read_payload(element, selector).await {
                    Ok(Some(payload)) => {
                        if ledger.record(payload, origin) {
                            added += 1;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!("Skipping unreadable artifact element in {}: {}", origin, e);
                    }
                }
            }
            return added;
        }

        debug!("No artifact elements in {}", origin);
        0
    }

    /// Text content of the element, falling back to the selector's
    /// designated attribute when the text is empty.
    async fn read_payload(
        &self,
        element: &BoxedElement,
        selector: &ArtifactSelector,
    ) -> Result<Option<String>, ContextError> {
        let text = element.text().await?;
        let text = text.trim();
        if !text.is_empty() {
            return Ok(Some(text.to_string()));
        }

        if let Some(attr) = &selector.fallback_attr
            && let Some(value) = element.attribute(attr).await?
        {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(Some(value.to_string()));
            }
        }

        Ok(None)
    }
}

impl Default for ArtifactCollector {
    fn default() -> Self {
        ArtifactCollector::new(default_selectors())
    }
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod collector_test;
