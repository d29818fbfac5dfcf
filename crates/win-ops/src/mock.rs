//! In-memory implementations of [`WinOps`], [`UiElement`] and
//! [`OverlaySurface`] for tests (enabled with the `test-utils` feature).
#![allow(missing_docs)]

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;

use crate::{
    CapturedWindow, ControlType, Element, Error, OverlayPlan, OverlaySurface, Point, Rect,
    Result, UiElement, WinOps, WindowId,
};

/// Builder for one node of a mock accessibility tree.
#[derive(Clone, Debug)]
pub struct MockNode {
    name: String,
    control_type: ControlType,
    bounds: Rect,
    offscreen: bool,
    invokable: bool,
    failing: bool,
    failing_bounds: bool,
    failing_sibling: bool,
    children: Vec<MockNode>,
}

impl MockNode {
    pub fn new(control_type: ControlType, name: &str) -> Self {
        Self {
            name: name.to_string(),
            control_type,
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            offscreen: false,
            invokable: false,
            failing: false,
            failing_bounds: false,
            failing_sibling: false,
            children: Vec::new(),
        }
    }

    /// Screen bounds in device pixels.
    pub fn bounds(mut self, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.bounds = Rect::new(x, y, w, h);
        self
    }

    pub fn offscreen(mut self) -> Self {
        self.offscreen = true;
        self
    }

    pub fn invokable(mut self) -> Self {
        self.invokable = true;
        self
    }

    /// Every property read on this node fails as stale.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Only reading this node's bounds fails.
    pub fn failing_bounds(mut self) -> Self {
        self.failing_bounds = true;
        self
    }

    /// Moving to this node's next sibling fails.
    pub fn failing_sibling(mut self) -> Self {
        self.failing_sibling = true;
        self
    }

    pub fn child(mut self, child: MockNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = MockNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn build(self) -> MockTree {
        let mut nodes = Vec::new();
        flatten(self, &mut nodes);
        MockTree {
            arena: Arc::new(nodes),
        }
    }
}

struct NodeData {
    name: String,
    control_type: ControlType,
    bounds: Rect,
    offscreen: bool,
    invokable: bool,
    failing: bool,
    failing_bounds: bool,
    failing_sibling: bool,
    first_child: Option<usize>,
    next_sibling: Option<usize>,
    stale: AtomicBool,
    invocations: AtomicUsize,
}

fn flatten(node: MockNode, out: &mut Vec<NodeData>) -> usize {
    let idx = out.len();
    out.push(NodeData {
        name: node.name,
        control_type: node.control_type,
        bounds: node.bounds,
        offscreen: node.offscreen,
        invokable: node.invokable,
        failing: node.failing,
        failing_bounds: node.failing_bounds,
        failing_sibling: node.failing_sibling,
        first_child: None,
        next_sibling: None,
        stale: AtomicBool::new(false),
        invocations: AtomicUsize::new(0),
    });
    let mut prev: Option<usize> = None;
    for child in node.children {
        let c = flatten(child, out);
        match prev {
            None => out[idx].first_child = Some(c),
            Some(p) => out[p].next_sibling = Some(c),
        }
        prev = Some(c);
    }
    idx
}

/// A built mock tree. Cloning shares the same nodes.
#[derive(Clone)]
pub struct MockTree {
    arena: Arc<Vec<NodeData>>,
}

impl MockTree {
    pub fn root(&self) -> Element {
        self.element(0)
    }

    fn element(&self, idx: usize) -> Element {
        Arc::new(MockElement {
            arena: self.arena.clone(),
            idx,
        })
    }

    fn find(&self, name: &str) -> Option<&NodeData> {
        self.arena.iter().find(|n| n.name == name)
    }

    /// How many times the named node was invoked.
    pub fn invocations(&self, name: &str) -> usize {
        self.find(name)
            .map(|n| n.invocations.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Make the named node report stale from now on, as if its UI closed.
    pub fn set_stale(&self, name: &str) {
        if let Some(n) = self.find(name) {
            n.stale.store(true, Ordering::SeqCst);
        }
    }
}

struct MockElement {
    arena: Arc<Vec<NodeData>>,
    idx: usize,
}

impl MockElement {
    fn data(&self) -> Result<&NodeData> {
        let n = &self.arena[self.idx];
        if n.failing || n.stale.load(Ordering::SeqCst) {
            return Err(Error::StaleElement);
        }
        Ok(n)
    }

    fn wrap(&self, idx: Option<usize>) -> Option<Element> {
        idx.map(|idx| {
            Arc::new(MockElement {
                arena: self.arena.clone(),
                idx,
            }) as Element
        })
    }
}

impl UiElement for MockElement {
    fn control_type(&self) -> Result<ControlType> {
        Ok(self.data()?.control_type)
    }
    fn name(&self) -> Result<String> {
        Ok(self.data()?.name.clone())
    }
    fn is_offscreen(&self) -> Result<bool> {
        Ok(self.data()?.offscreen)
    }
    fn bounds(&self) -> Result<Rect> {
        let n = self.data()?;
        if n.failing_bounds {
            return Err(Error::StaleElement);
        }
        Ok(n.bounds)
    }
    fn first_child(&self) -> Result<Option<Element>> {
        let n = &self.arena[self.idx];
        Ok(self.wrap(n.first_child))
    }
    fn next_sibling(&self) -> Result<Option<Element>> {
        let n = &self.arena[self.idx];
        if n.failing_sibling {
            return Err(Error::StaleElement);
        }
        Ok(self.wrap(n.next_sibling))
    }
    fn can_invoke(&self) -> bool {
        self.data().is_ok_and(|n| n.invokable)
    }
    fn invoke(&self) -> Result<()> {
        let n = self.data()?;
        if !n.invokable {
            return Err(Error::NotSupported("invoke"));
        }
        n.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct OpsState {
    calls: Mutex<Vec<String>>,
    foreground: Mutex<Option<WindowId>>,
    windows: Mutex<HashMap<WindowId, (CapturedWindow, Option<MockTree>)>>,
    clicks: Mutex<Vec<Point>>,
    activations: Mutex<Vec<WindowId>>,
    fail_click: AtomicBool,
}

/// Mock window layer. Clones share state.
#[derive(Clone, Default)]
pub struct MockWinOps {
    state: Arc<OpsState>,
}

impl MockWinOps {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_foreground(&self, id: Option<WindowId>) {
        *self.state.foreground.lock() = id;
    }
    /// Register a window and, optionally, its accessibility tree.
    pub fn add_window(&self, window: CapturedWindow, tree: Option<MockTree>) {
        self.state.windows.lock().insert(window.id, (window, tree));
    }
    pub fn remove_window(&self, id: WindowId) {
        self.state.windows.lock().remove(&id);
    }
    pub fn clicks(&self) -> Vec<Point> {
        self.state.clicks.lock().clone()
    }
    pub fn activations(&self) -> Vec<WindowId> {
        self.state.activations.lock().clone()
    }
    pub fn calls_contains(&self, s: &str) -> bool {
        self.state.calls.lock().iter().any(|x| x == s)
    }
    pub fn set_fail_click(&self, v: bool) {
        self.state.fail_click.store(v, Ordering::SeqCst);
    }
    fn note(&self, s: &str) {
        self.state.calls.lock().push(s.to_string());
    }
}

impl WinOps for MockWinOps {
    fn foreground_window(&self) -> Option<WindowId> {
        self.note("foreground_window");
        *self.state.foreground.lock()
    }
    fn capture_window(&self, id: WindowId) -> Result<CapturedWindow> {
        self.note("capture_window");
        self.state
            .windows
            .lock()
            .get(&id)
            .map(|(w, _)| *w)
            .ok_or(Error::WindowGone)
    }
    fn root_element(&self, window: &CapturedWindow) -> Result<Element> {
        self.note("root_element");
        match self.state.windows.lock().get(&window.id) {
            Some((_, Some(tree))) => Ok(tree.root()),
            Some((_, None)) => Err(Error::NotSupported("ui automation")),
            None => Err(Error::WindowGone),
        }
    }
    fn send_click(&self, at: Point) -> Result<()> {
        self.note("send_click");
        if self.state.fail_click.load(Ordering::SeqCst) {
            return Err(Error::Os {
                op: "SendInput",
                message: "blocked".into(),
            });
        }
        self.state.clicks.lock().push(at);
        Ok(())
    }
    fn activate_window(&self, id: WindowId) {
        self.note("activate_window");
        self.state.activations.lock().push(id);
    }
}

/// A call recorded by [`MockOverlay`].
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayCall {
    /// [`OverlaySurface::open`].
    Open {
        /// Session that opened the overlay.
        session: u64,
        /// The plan as received.
        plan: OverlayPlan,
    },
    /// [`OverlaySurface::set_text`].
    Text {
        /// Session whose overlay was updated.
        session: u64,
        /// Echoed text.
        text: String,
    },
    /// [`OverlaySurface::close`].
    Close {
        /// Session whose overlay was closed.
        session: u64,
    },
}

/// Mock overlay surface recording every call.
#[derive(Clone, Default)]
pub struct MockOverlay {
    calls: Arc<Mutex<Vec<OverlayCall>>>,
    fail_open: Arc<AtomicBool>,
    window: Arc<Mutex<Option<WindowId>>>,
}

impl MockOverlay {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn calls(&self) -> Vec<OverlayCall> {
        self.calls.lock().clone()
    }
    pub fn set_fail_open(&self, v: bool) {
        self.fail_open.store(v, Ordering::SeqCst);
    }
    /// Handle the surface reports as its own overlay window.
    pub fn set_window(&self, id: Option<WindowId>) {
        *self.window.lock() = id;
    }
    /// The most recently opened plan.
    pub fn last_plan(&self) -> Option<OverlayPlan> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            OverlayCall::Open { plan, .. } => Some(plan.clone()),
            _ => None,
        })
    }
    /// Session of the overlay currently shown, if any.
    pub fn open_session(&self) -> Option<u64> {
        let mut open = None;
        for c in self.calls.lock().iter() {
            match c {
                OverlayCall::Open { session, .. } => open = Some(*session),
                OverlayCall::Close { session } if open == Some(*session) => open = None,
                _ => {}
            }
        }
        open
    }
    /// Most recent echoed text.
    pub fn last_text(&self) -> Option<String> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            OverlayCall::Text { text, .. } => Some(text.clone()),
            _ => None,
        })
    }
}

impl OverlaySurface for MockOverlay {
    fn open(&self, session: u64, plan: &OverlayPlan) -> Result<()> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(Error::OverlayUnavailable);
        }
        self.calls.lock().push(OverlayCall::Open {
            session,
            plan: plan.clone(),
        });
        Ok(())
    }
    fn set_text(&self, session: u64, text: &str) -> Result<()> {
        self.calls.lock().push(OverlayCall::Text {
            session,
            text: text.to_string(),
        });
        Ok(())
    }
    fn close(&self, session: u64) -> Result<()> {
        self.calls.lock().push(OverlayCall::Close { session });
        Ok(())
    }
    fn owns_window(&self, window: WindowId) -> bool {
        *self.window.lock() == Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_navigation_follows_declaration_order() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "a"))
            .child(
                MockNode::new(ControlType::Pane, "b")
                    .child(MockNode::new(ControlType::Hyperlink, "b1")),
            )
            .child(MockNode::new(ControlType::Edit, "c"))
            .build();
        let root = tree.root();
        let a = root.first_child().unwrap().unwrap();
        assert_eq!(a.name().unwrap(), "a");
        let b = a.next_sibling().unwrap().unwrap();
        assert_eq!(b.name().unwrap(), "b");
        let b1 = b.first_child().unwrap().unwrap();
        assert_eq!(b1.control_type().unwrap(), ControlType::Hyperlink);
        assert!(b1.next_sibling().unwrap().is_none());
        let c = b.next_sibling().unwrap().unwrap();
        assert_eq!(c.name().unwrap(), "c");
        assert!(c.next_sibling().unwrap().is_none());
    }

    #[test]
    fn stale_nodes_fail_reads_and_invoke() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "ok").invokable())
            .build();
        let ok = tree.root().first_child().unwrap().unwrap();
        ok.invoke().unwrap();
        assert_eq!(tree.invocations("ok"), 1);
        tree.set_stale("ok");
        assert_eq!(ok.invoke(), Err(Error::StaleElement));
        assert!(!ok.can_invoke());
        assert_eq!(tree.invocations("ok"), 1);
    }

    #[test]
    fn overlay_tracks_open_session() {
        let o = MockOverlay::new();
        let plan = OverlayPlan {
            frame: Rect::new(0.0, 0.0, 1.0, 1.0),
            dpi: 96,
            marks: vec![],
        };
        o.open(1, &plan).unwrap();
        assert_eq!(o.open_session(), Some(1));
        o.open(2, &plan).unwrap();
        o.close(1).unwrap();
        assert_eq!(o.open_session(), Some(2));
        o.close(2).unwrap();
        assert_eq!(o.open_session(), None);
    }
}
