use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder, Locator};
use tracing::{debug, info};
use url::Url;

use crate::context::{BoxedElement, BrowsingContext, ElementRef};
use crate::errors::ContextError;
use crate::types::{ChildRef, ContextId};

/// WebDriver code point for the Enter key.
const ENTER_KEY: &str = "\u{E007}";

/// Controls worth probing in a hunt page.
const ACTIONABLE_SELECTOR: &str =
    "button, input, select, textarea, a[href], [role='button'], [onclick]";

/// A live WebDriver session whose browser windows form the context graph.
///
/// Each window is one browsing context. Entering a child switches the
/// session to that window with the parent handle kept on a stack, so the
/// single WebDriver cursor moves exactly the way the traversal expects.
/// Window handles are attributed to the context that was current when they
/// first appeared, in listing order; that attribution assigns the stable
/// discovery indices the traversal derives its ids from, so a window listed
/// again later (from any context) resolves to the id it was first seen
/// under instead of being mistaken for a new child.
pub struct WindowSession {
    client: Client,
    /// Cursor path from the root window down to the current one.
    stack: Vec<WindowRecord>,
    /// Every handle ever attributed, in discovery order; the position in
    /// this list is the window's discovery index.
    discovered: Vec<WindowHandle>,
}

struct WindowRecord {
    index: usize,
    handle: WindowHandle,
    /// Discovery indices of the windows attributed to this context.
    children: Vec<usize>,
}

impl WindowSession {
    /// Connect to a running WebDriver, open `start_url`, and treat that
    /// window as the root context.
    pub async fn connect(webdriver_url: &str, start_url: &str) -> Result<Self> {
        Self::connect_with_capabilities(webdriver_url, start_url, serde_json::Map::new()).await
    }

    /// Like [`WindowSession::connect`] with explicit session capabilities
    /// (e.g. `moz:firefoxOptions` for headless mode).
    pub async fn connect_with_capabilities(
        webdriver_url: &str,
        start_url: &str,
        capabilities: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self> {
        let start = Url::parse(start_url).context("Invalid start URL")?;

        if !Self::is_webdriver_running(webdriver_url).await {
            anyhow::bail!(
                "Cannot reach WebDriver at {}.\n\
                Please ensure a driver is running:\n\
                  For Firefox: geckodriver --port 4444\n\
                  For Chrome: chromedriver --port 9515",
                webdriver_url
            );
        }

        info!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::rustls()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .context("Failed to connect to WebDriver")?;

        client
            .goto(start.as_str())
            .await
            .context("Failed to open start URL")?;

        let root = client
            .window()
            .await
            .context("Failed to read the root window handle")?;

        Ok(WindowSession {
            client,
            stack: vec![WindowRecord {
                index: ContextId::ROOT_INDEX,
                handle: root.clone(),
                children: Vec::new(),
            }],
            discovered: vec![root],
        })
    }

    async fn is_webdriver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url.trim_end_matches('/'));
        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// End the WebDriver session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await.context("Failed to close session")
    }

    fn current(&self) -> Result<&WindowRecord, ContextError> {
        self.stack
            .last()
            .ok_or_else(|| ContextError::other("window stack is empty"))
    }
}

#[async_trait]
impl BrowsingContext for WindowSession {
    async fn children(&mut self) -> Result<Vec<ChildRef>, ContextError> {
        let handles = self
            .client
            .windows()
            .await
            .map_err(|e| ContextError::other(e))?;

        // Attribute handles nobody has claimed yet to the current context,
        // in listing order.
        let mut fresh = Vec::new();
        for handle in handles {
            if !self.discovered.iter().any(|known| known == &handle) {
                fresh.push(self.discovered.len());
                self.discovered.push(handle);
            }
        }

        let Some(current) = self.stack.last_mut() else {
            return Err(ContextError::other("window stack is empty"));
        };
        if !fresh.is_empty() {
            debug!(
                "Attributed {} new window(s) to window {}",
                fresh.len(),
                current.index
            );
        }
        current.children.extend(fresh);

        Ok(current.children.iter().map(|&i| ChildRef::new(i)).collect())
    }

    async fn enter(&mut self, child: &ChildRef) -> Result<(), ContextError> {
        let current = self.current()?;
        if !current.children.contains(&child.index) {
            return Err(ContextError::unavailable(format!(
                "window {} is not a child of window {}",
                child.index, current.index
            )));
        }
        let handle = match self.discovered.get(child.index) {
            Some(handle) => handle.clone(),
            None => {
                return Err(ContextError::unavailable(format!(
                    "window {} was never discovered",
                    child.index
                )));
            }
        };

        self.client
            .switch_to_window(handle.clone())
            .await
            .map_err(|e| ContextError::unavailable(format!("window {}: {}", child.index, e)))?;

        self.stack.push(WindowRecord {
            index: child.index,
            handle,
            children: Vec::new(),
        });
        Ok(())
    }

    async fn exit(&mut self) -> Result<(), ContextError> {
        if self.stack.len() <= 1 {
            return Err(ContextError::other("already at the root context"));
        }
        self.stack.pop();
        let parent = self.current()?;
        self.client
            .switch_to_window(parent.handle.clone())
            .await
            .map_err(|e| ContextError::unavailable(format!("parent window {}: {}", parent.index, e)))
    }

    async fn is_ready(&mut self) -> Result<bool, ContextError> {
        let ready = self
            .client
            .execute("return document.readyState === 'complete';", vec![])
            .await
            .map_err(|e| ContextError::other(e))?;
        Ok(ready.as_bool().unwrap_or(false))
    }

    async fn find_artifact_elements(
        &mut self,
        selector: &str,
    ) -> Result<Vec<BoxedElement>, ContextError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| ContextError::other(e))?;
        Ok(elements.into_iter().map(boxed).collect())
    }

    async fn find_actionable_elements(&mut self) -> Result<Vec<BoxedElement>, ContextError> {
        let elements = self
            .client
            .find_all(Locator::Css(ACTIONABLE_SELECTOR))
            .await
            .map_err(|e| ContextError::other(e))?;
        Ok(elements.into_iter().map(boxed).collect())
    }
}

fn boxed(element: Element) -> BoxedElement {
    Box::new(WebdriverElement { element })
}

/// One element handle inside the session's current window.
struct WebdriverElement {
    element: Element,
}

#[async_trait]
impl ElementRef for WebdriverElement {
    async fn text(&self) -> Result<String, ContextError> {
        self.element
            .text()
            .await
            .map_err(|e| ContextError::interaction(e))
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ContextError> {
        self.element
            .attr(name)
            .await
            .map_err(|e| ContextError::interaction(e))
    }

    async fn is_visible(&self) -> Result<bool, ContextError> {
        self.element
            .is_displayed()
            .await
            .map_err(|e| ContextError::interaction(e))
    }

    async fn is_enabled(&self) -> Result<bool, ContextError> {
        let disabled = self
            .element
            .attr("disabled")
            .await
            .map_err(|e| ContextError::interaction(e))?;
        Ok(disabled.is_none())
    }

    async fn click(&self) -> Result<(), ContextError> {
        self.element
            .click()
            .await
            .map_err(|e| ContextError::interaction(e))
    }

    async fn fill(&self, text: &str) -> Result<(), ContextError> {
        self.element
            .clear()
            .await
            .map_err(|e| ContextError::interaction(e))?;
        self.element
            .send_keys(text)
            .await
            .map_err(|e| ContextError::interaction(e))
    }

    async fn submit(&self) -> Result<(), ContextError> {
        // Enter in a form field triggers the enclosing form's submission.
        self.element
            .send_keys(ENTER_KEY)
            .await
            .map_err(|e| ContextError::interaction(e))
    }
}
