use serde::Serialize;
use tracing::{debug, warn};

use crate::context::{BoxedElement, BrowsingContext};
use crate::errors::ContextError;

/// Counts of probing actions performed inside one context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub clicked: usize,
    pub forms_submitted: usize,
}

impl ActionReport {
    /// Total number of actions that went through.
    pub fn attempted(&self) -> usize {
        self.clicked + self.forms_submitted
    }
}

/// Generic, content-agnostic probing of a context's controls.
///
/// Injected puzzle content has no static contract, so the only way to make
/// hidden children appear is to poke everything: click every visible,
/// enabled, non-excluded control and satisfy every required-but-empty input
/// before submitting its form. Each attempt is independent; one stubborn
/// control never blocks the rest.
#[derive(Debug, Clone)]
pub struct ActionPerformer {
    excluded: Vec<String>,
    fill_placeholder: String,
}

impl ActionPerformer {
    /// `excluded` entries suppress controls whose `id` attribute equals the
    /// entry or whose text contains it, case-insensitively.
    pub fn new(excluded: Vec<String>) -> Self {
        ActionPerformer {
            excluded: excluded.into_iter().map(|e| e.to_lowercase()).collect(),
            fill_placeholder: "probe".to_string(),
        }
    }

    /// Override the value written into required-but-empty inputs.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.fill_placeholder = placeholder.into();
        self
    }

    /// Probe every actionable element in the current context.
    pub async fn perform_available_actions(
        &self,
        ctx: &mut (dyn BrowsingContext + Send),
    ) -> ActionReport {
        let mut report = ActionReport::default();

        let elements = match ctx.find_actionable_elements().await {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Could not enumerate actionable elements: {}", e);
                return report;
            }
        };

        debug!("Probing {} actionable element(s)", elements.len());

        for element in &elements {
            match self.probe_element(element).await {
                Ok(Some(Action::Clicked)) => report.clicked += 1,
                Ok(Some(Action::Submitted)) => report.forms_submitted += 1,
                Ok(None) => {}
                Err(e) => {
                    debug!("Skipping control after failed interaction: {}", e);
                }
            }
        }

        report
    }

    async fn probe_element(&self, element: &BoxedElement) -> Result<Option<Action>, ContextError> {
        if !element.is_visible().await? || !element.is_enabled().await? {
            return Ok(None);
        }

        let text = element.text().await.unwrap_or_default();
        let id = element.attribute("id").await.unwrap_or(None);
        if self.is_excluded(&text, id.as_deref()) {
            debug!("Control '{}' is excluded, skipping", text.trim());
            return Ok(None);
        }

        // Required inputs without a value get filled and their form
        // submitted; everything else gets clicked.
        if element.attribute("required").await?.is_some() {
            let value = element.attribute("value").await?.unwrap_or_default();
            if value.trim().is_empty() {
                element.fill(&self.fill_placeholder).await?;
                element.submit().await?;
                return Ok(Some(Action::Submitted));
            }
        }

        element.click().await?;
        Ok(Some(Action::Clicked))
    }

    fn is_excluded(&self, text: &str, id: Option<&str>) -> bool {
        let text = text.to_lowercase();
        self.excluded.iter().any(|entry| {
            text.contains(entry) || id.is_some_and(|id| id.eq_ignore_ascii_case(entry))
        })
    }
}

impl Default for ActionPerformer {
    fn default() -> Self {
        ActionPerformer::new(Vec::new())
    }
}

enum Action {
    Clicked,
    Submitted,
}

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;
