use async_trait::async_trait;

use crate::errors::ContextError;
use crate::types::ChildRef;

/// An element handle usable independently of the context cursor.
pub type BoxedElement = Box<dyn ElementRef + Send + Sync>;

/// One browsing context in the graph: an environment hosting content and
/// child contexts (an iframe, a window, or a synthetic stand-in in tests).
///
/// Implementations wrap the single shared "current context" cursor of the
/// underlying automation session. `enter` and `exit` move that cursor, so
/// the trait is consumed through `&mut`; the borrow system enforces that
/// entry and exit stay strictly sequential.
#[async_trait]
pub trait BrowsingContext {
    /// Child contexts currently reachable from here, in discovery order.
    ///
    /// Discovery indices are assigned once, in the order the session first
    /// surfaces each context, and are stable for the session's lifetime:
    /// the entry context is [`ContextId::ROOT_INDEX`], re-enumerations keep
    /// earlier indices, and a context that is re-materialized (or reached
    /// again through a back-edge) is reported under its original index.
    async fn children(&mut self) -> Result<Vec<ChildRef>, ContextError>;

    /// Move the cursor into `child`.
    async fn enter(&mut self, child: &ChildRef) -> Result<(), ContextError>;

    /// Move the cursor back to the parent of the current context.
    async fn exit(&mut self) -> Result<(), ContextError>;

    /// Whether the current context has finished materializing its content.
    async fn is_ready(&mut self) -> Result<bool, ContextError>;

    /// Elements in the current context matching an artifact selector.
    async fn find_artifact_elements(
        &mut self,
        selector: &str,
    ) -> Result<Vec<BoxedElement>, ContextError>;

    /// Controls in the current context worth probing: clickable elements
    /// and fillable inputs.
    async fn find_actionable_elements(&mut self) -> Result<Vec<BoxedElement>, ContextError>;
}

/// A single element inside a browsing context.
#[async_trait]
pub trait ElementRef {
    async fn text(&self) -> Result<String, ContextError>;

    async fn attribute(&self, name: &str) -> Result<Option<String>, ContextError>;

    async fn is_visible(&self) -> Result<bool, ContextError>;

    async fn is_enabled(&self) -> Result<bool, ContextError>;

    async fn click(&self) -> Result<(), ContextError>;

    /// Replace the element's value with `text`.
    async fn fill(&self, text: &str) -> Result<(), ContextError>;

    /// Submit the nearest form enclosing this element.
    async fn submit(&self) -> Result<(), ContextError>;
}
