// Common test utilities: a scripted in-memory context graph

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use framescout::{BoxedElement, BrowsingContext, ChildRef, ContextError, ElementRef};

static INIT: Once = Once::new();

/// Opt-in log output for debugging test runs, driven by RUST_LOG.
#[allow(dead_code)]
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Cursor movement recorded by the mock graph, by node index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Enter(usize),
    Exit(usize),
}

/// Panics unless every Enter has exactly one properly nested Exit.
#[allow(dead_code)]
pub fn assert_enter_exit_balanced(events: &[Event]) {
    let mut stack = Vec::new();
    for event in events {
        match event {
            Event::Enter(idx) => stack.push(*idx),
            Event::Exit(idx) => {
                let top = stack.pop();
                assert_eq!(
                    top,
                    Some(*idx),
                    "Exit({}) does not match the innermost Enter ({:?})",
                    idx,
                    top
                );
            }
        }
    }
    assert!(stack.is_empty(), "unexited contexts remain: {:?}", stack);
}

/// One scripted control inside a mock node.
#[derive(Debug, Clone)]
pub struct MockControl {
    pub text: String,
    pub id: Option<String>,
    pub visible: bool,
    pub enabled: bool,
    pub required_empty: bool,
    pub fail_interaction: bool,
    pub filled: Option<String>,
}

#[allow(dead_code)]
impl MockControl {
    pub fn button(text: &str) -> Self {
        MockControl {
            text: text.to_string(),
            id: None,
            visible: true,
            enabled: true,
            required_empty: false,
            fail_interaction: false,
            filled: None,
        }
    }

    pub fn required_input() -> Self {
        MockControl {
            text: String::new(),
            id: None,
            visible: true,
            enabled: true,
            required_empty: true,
            fail_interaction: false,
            filled: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn invisible(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_interaction = true;
        self
    }
}

/// One scripted node. Nodes are keyed by their discovery index; the root is
/// node 0.
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    children: Vec<usize>,
    /// Children appended to the listing once an action succeeds here.
    hidden: Vec<usize>,
    /// (text, fails) pairs matched by the ".artifact" marker selector.
    markers: Vec<(String, bool)>,
    /// Values matched by "[data-artifact]"; the elements have empty text.
    data_values: Vec<String>,
    controls: Vec<MockControl>,
    fail_entry: bool,
    fail_exit: bool,
    fail_children: bool,
    duplicate_listing: bool,
    not_ready_polls: u32,
}

pub struct GraphBuilder {
    nodes: HashMap<usize, MockNode>,
}

impl GraphBuilder {
    pub fn node(&mut self, idx: usize) -> NodeBuilder<'_> {
        NodeBuilder {
            node: self.nodes.entry(idx).or_default(),
        }
    }
}

pub struct NodeBuilder<'a> {
    node: &'a mut MockNode,
}

#[allow(dead_code)]
impl NodeBuilder<'_> {
    pub fn children(self, kids: &[usize]) -> Self {
        self.node.children = kids.to_vec();
        self
    }

    pub fn hidden(self, kids: &[usize]) -> Self {
        self.node.hidden = kids.to_vec();
        self
    }

    pub fn marker(self, text: &str) -> Self {
        self.node.markers.push((text.to_string(), false));
        self
    }

    pub fn failing_marker(self, text: &str) -> Self {
        self.node.markers.push((text.to_string(), true));
        self
    }

    pub fn data_artifact(self, value: &str) -> Self {
        self.node.data_values.push(value.to_string());
        self
    }

    pub fn control(self, control: MockControl) -> Self {
        self.node.controls.push(control);
        self
    }

    pub fn button(self, text: &str) -> Self {
        self.control(MockControl::button(text))
    }

    pub fn fail_entry(self) -> Self {
        self.node.fail_entry = true;
        self
    }

    pub fn fail_exit(self) -> Self {
        self.node.fail_exit = true;
        self
    }

    pub fn fail_children(self) -> Self {
        self.node.fail_children = true;
        self
    }

    pub fn duplicate_listing(self) -> Self {
        self.node.duplicate_listing = true;
        self
    }

    pub fn not_ready(self, polls: u32) -> Self {
        self.node.not_ready_polls = polls;
        self
    }
}

#[derive(Debug, Default)]
struct World {
    nodes: HashMap<usize, MockNode>,
    cursor: Vec<usize>,
    events: Vec<Event>,
    clicks: HashMap<usize, usize>,
    submits: HashMap<usize, usize>,
    fills: Vec<(usize, String)>,
}

impl World {
    fn current(&self) -> usize {
        *self.cursor.last().expect("cursor stack is never empty")
    }

    /// A successful action makes the node's hidden children appear.
    fn reveal(&mut self, node: usize) {
        if let Some(n) = self.nodes.get_mut(&node) {
            let hidden = std::mem::take(&mut n.hidden);
            n.children.extend(hidden);
        }
    }
}

/// Scripted in-memory context graph implementing the collaborator traits.
pub struct MockGraph {
    world: Arc<Mutex<World>>,
}

#[allow(dead_code)]
impl MockGraph {
    pub fn build(f: impl FnOnce(&mut GraphBuilder)) -> Self {
        let mut builder = GraphBuilder {
            nodes: HashMap::new(),
        };
        builder.nodes.entry(0).or_default();
        f(&mut builder);
        MockGraph {
            world: Arc::new(Mutex::new(World {
                nodes: builder.nodes,
                cursor: vec![0],
                ..World::default()
            })),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.world.lock().unwrap().events.clone()
    }

    pub fn clicks(&self, node: usize) -> usize {
        *self.world.lock().unwrap().clicks.get(&node).unwrap_or(&0)
    }

    pub fn submits(&self, node: usize) -> usize {
        *self.world.lock().unwrap().submits.get(&node).unwrap_or(&0)
    }

    pub fn fills(&self) -> Vec<(usize, String)> {
        self.world.lock().unwrap().fills.clone()
    }
}

#[async_trait]
impl BrowsingContext for MockGraph {
    async fn children(&mut self) -> Result<Vec<ChildRef>, ContextError> {
        let world = self.world.lock().unwrap();
        let current = world.current();
        let node = world
            .nodes
            .get(&current)
            .ok_or_else(|| ContextError::other(format!("node {} missing", current)))?;

        if node.fail_children {
            return Err(ContextError::other(format!(
                "node {} cannot list children",
                current
            )));
        }

        let mut listing: Vec<ChildRef> = node.children.iter().map(|&i| ChildRef::new(i)).collect();
        if node.duplicate_listing
            && let Some(first) = listing.first().cloned()
        {
            listing.push(first);
        }
        Ok(listing)
    }

    async fn enter(&mut self, child: &ChildRef) -> Result<(), ContextError> {
        let mut world = self.world.lock().unwrap();
        let target = match world.nodes.get(&child.index) {
            Some(node) => node,
            None => {
                return Err(ContextError::unavailable(format!(
                    "node {} does not exist",
                    child.index
                )));
            }
        };
        if target.fail_entry {
            return Err(ContextError::unavailable(format!(
                "node {} refused entry",
                child.index
            )));
        }
        world.cursor.push(child.index);
        world.events.push(Event::Enter(child.index));
        Ok(())
    }

    async fn exit(&mut self) -> Result<(), ContextError> {
        let mut world = self.world.lock().unwrap();
        if world.cursor.len() <= 1 {
            return Err(ContextError::other("already at the root"));
        }
        let leaving = world.current();
        if world
            .nodes
            .get(&leaving)
            .is_some_and(|node| node.fail_exit)
        {
            return Err(ContextError::unavailable(format!(
                "node {} cannot be exited",
                leaving
            )));
        }
        world.cursor.pop();
        world.events.push(Event::Exit(leaving));
        Ok(())
    }

    async fn is_ready(&mut self) -> Result<bool, ContextError> {
        let mut world = self.world.lock().unwrap();
        let current = world.current();
        if let Some(node) = world.nodes.get_mut(&current)
            && node.not_ready_polls > 0
        {
            node.not_ready_polls -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    async fn find_artifact_elements(
        &mut self,
        selector: &str,
    ) -> Result<Vec<BoxedElement>, ContextError> {
        let world = self.world.lock().unwrap();
        let current = world.current();
        let node = world
            .nodes
            .get(&current)
            .ok_or_else(|| ContextError::other(format!("node {} missing", current)))?;

        let elements: Vec<BoxedElement> = match selector {
            ".artifact" => (0..node.markers.len())
                .map(|i| self.element(current, ElemKind::Marker(i)))
                .collect(),
            "[data-artifact]" => (0..node.data_values.len())
                .map(|i| self.element(current, ElemKind::DataAttr(i)))
                .collect(),
            _ => Vec::new(),
        };
        Ok(elements)
    }

    async fn find_actionable_elements(&mut self) -> Result<Vec<BoxedElement>, ContextError> {
        let world = self.world.lock().unwrap();
        let current = world.current();
        let node = world
            .nodes
            .get(&current)
            .ok_or_else(|| ContextError::other(format!("node {} missing", current)))?;

        Ok((0..node.controls.len())
            .map(|i| self.element(current, ElemKind::Control(i)))
            .collect())
    }
}

impl MockGraph {
    fn element(&self, node: usize, kind: ElemKind) -> BoxedElement {
        Box::new(MockElement {
            world: Arc::clone(&self.world),
            node,
            kind,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum ElemKind {
    Marker(usize),
    DataAttr(usize),
    Control(usize),
}

struct MockElement {
    world: Arc<Mutex<World>>,
    node: usize,
    kind: ElemKind,
}

impl MockElement {
    fn with_control<R>(
        &self,
        f: impl FnOnce(&mut World, usize, &mut MockControl) -> R,
    ) -> Result<R, ContextError> {
        let mut world = self.world.lock().unwrap();
        let idx = match self.kind {
            ElemKind::Control(i) => i,
            _ => return Err(ContextError::interaction("element is not a control")),
        };
        let node = self.node;
        let mut control = world
            .nodes
            .get_mut(&node)
            .and_then(|n| n.controls.get_mut(idx))
            .ok_or_else(|| ContextError::interaction("control vanished"))?
            .clone();
        let result = f(&mut *world, node, &mut control);
        if let Some(n) = world.nodes.get_mut(&node)
            && let Some(slot) = n.controls.get_mut(idx)
        {
            *slot = control;
        }
        Ok(result)
    }
}

#[async_trait]
impl ElementRef for MockElement {
    async fn text(&self) -> Result<String, ContextError> {
        let world = self.world.lock().unwrap();
        let node = world
            .nodes
            .get(&self.node)
            .ok_or_else(|| ContextError::interaction("node vanished"))?;
        match self.kind {
            ElemKind::Marker(i) => {
                let (text, fails) = node
                    .markers
                    .get(i)
                    .ok_or_else(|| ContextError::interaction("marker vanished"))?;
                if *fails {
                    Err(ContextError::interaction("marker element is detached"))
                } else {
                    Ok(text.clone())
                }
            }
            // Data-attribute artifacts carry their value in the attribute,
            // not the text.
            ElemKind::DataAttr(_) => Ok(String::new()),
            ElemKind::Control(i) => Ok(node
                .controls
                .get(i)
                .map(|c| c.text.clone())
                .unwrap_or_default()),
        }
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, ContextError> {
        let world = self.world.lock().unwrap();
        let node = world
            .nodes
            .get(&self.node)
            .ok_or_else(|| ContextError::interaction("node vanished"))?;
        match self.kind {
            ElemKind::DataAttr(i) => {
                if name == "data-artifact" {
                    Ok(node.data_values.get(i).cloned())
                } else {
                    Ok(None)
                }
            }
            ElemKind::Control(i) => {
                let control = node
                    .controls
                    .get(i)
                    .ok_or_else(|| ContextError::interaction("control vanished"))?;
                match name {
                    "id" => Ok(control.id.clone()),
                    "required" => Ok(control.required_empty.then(|| "true".to_string())),
                    "value" => Ok(control.filled.clone()),
                    _ => Ok(None),
                }
            }
            ElemKind::Marker(_) => Ok(None),
        }
    }

    async fn is_visible(&self) -> Result<bool, ContextError> {
        match self.kind {
            ElemKind::Control(_) => self.with_control(|_, _, c| c.visible),
            _ => Ok(true),
        }
    }

    async fn is_enabled(&self) -> Result<bool, ContextError> {
        match self.kind {
            ElemKind::Control(_) => self.with_control(|_, _, c| c.enabled),
            _ => Ok(true),
        }
    }

    async fn click(&self) -> Result<(), ContextError> {
        self.with_control(|world, node, control| {
            if control.fail_interaction {
                return Err(ContextError::interaction("control is detached"));
            }
            *world.clicks.entry(node).or_insert(0) += 1;
            world.reveal(node);
            Ok(())
        })?
    }

    async fn fill(&self, text: &str) -> Result<(), ContextError> {
        self.with_control(|world, node, control| {
            if control.fail_interaction {
                return Err(ContextError::interaction("control is detached"));
            }
            control.filled = Some(text.to_string());
            world.fills.push((node, text.to_string()));
            Ok(())
        })?
    }

    async fn submit(&self) -> Result<(), ContextError> {
        self.with_control(|world, node, control| {
            if control.fail_interaction {
                return Err(ContextError::interaction("control is detached"));
            }
            *world.submits.entry(node).or_insert(0) += 1;
            world.reveal(node);
            Ok(())
        })?
    }
}
