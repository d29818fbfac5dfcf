//! Element discovery.
//!
//! A finder turns the accessibility root of a captured window into an ordered
//! list of candidate elements. The order is the hint label order, so finders
//! must be deterministic for a static UI.

use std::sync::Arc;

use tracing::{debug, trace};
use win_ops::{CapturedWindow, ControlType, Describe, Element, UiElement};

use crate::{action::Action, plugin::Catalog};

/// Strategy that enumerates interactable elements of a window.
pub trait ElementFinder: Send + Sync {
    /// Whether this finder wants to handle the window rooted at `root`.
    fn can_handle(&self, root: &Element) -> bool;

    /// Candidate elements in label order.
    fn find_elements(&self, window: &CapturedWindow, root: &Element) -> Vec<Element>;
}

/// Control types the default finder offers as targets.
pub const DEFAULT_TARGETS: &[ControlType] = &[
    ControlType::Button,
    ControlType::Hyperlink,
    ControlType::Tab,
    ControlType::TabItem,
    ControlType::CheckBox,
    ControlType::RadioButton,
    ControlType::Edit,
    ControlType::ComboBox,
    ControlType::List,
    ControlType::ListItem,
    ControlType::DataItem,
    ControlType::Menu,
    ControlType::MenuItem,
    ControlType::TreeItem,
    ControlType::Table,
    ControlType::DataGrid,
];

/// Maximum depth below the root that the default finder visits.
pub const DEFAULT_MAX_DEPTH: usize = 25;

/// Depth-first, pre-order walk over the accessibility tree.
///
/// The root itself is never a candidate; its children are at depth 1. An
/// off-screen node is pruned together with its subtree. A node whose
/// properties cannot be read is skipped but its children are still visited.
/// When the next sibling cannot be obtained the remaining siblings are
/// abandoned.
#[derive(Debug, Clone)]
pub struct TreeWalkFinder {
    max_depth: usize,
    targets: Vec<ControlType>,
}

impl Default for TreeWalkFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeWalkFinder {
    /// Finder with the default depth and target list.
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            targets: DEFAULT_TARGETS.to_vec(),
        }
    }

    /// Override the depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Override the accepted control types.
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = ControlType>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Visit the children of `parent` in order.
    fn walk_children(&self, parent: &dyn UiElement, depth: usize, out: &mut Vec<Element>) {
        if depth > self.max_depth {
            return;
        }
        let mut next = match parent.first_child() {
            Ok(child) => child,
            Err(e) => {
                debug!(node = %Describe(parent), error = %e, "children_unreadable");
                return;
            }
        };
        while let Some(node) = next {
            self.visit(&node, depth, out);
            next = match node.next_sibling() {
                Ok(sibling) => sibling,
                Err(e) => {
                    debug!(depth, error = %e, "sibling_run_stopped");
                    None
                }
            };
        }
    }

    /// Collect `node` if it is a target, then descend.
    fn visit(&self, node: &Element, depth: usize, out: &mut Vec<Element>) {
        match self.classify(node.as_ref()) {
            Ok(Visit::Prune) => {
                trace!(depth, "offscreen_pruned");
                return;
            }
            Ok(Visit::Take) => out.push(node.clone()),
            Ok(Visit::Pass) => {}
            Err(e) => debug!(depth, error = %e, "node_skipped"),
        }
        self.walk_children(node.as_ref(), depth + 1, out);
    }

    /// Decide what to do with one node.
    fn classify(&self, node: &dyn UiElement) -> win_ops::Result<Visit> {
        if node.is_offscreen()? {
            return Ok(Visit::Prune);
        }
        let ct = node.control_type()?;
        Ok(if self.targets.contains(&ct) {
            Visit::Take
        } else {
            Visit::Pass
        })
    }
}

/// Outcome of inspecting one node.
enum Visit {
    Prune,
    Take,
    Pass,
}

impl ElementFinder for TreeWalkFinder {
    fn can_handle(&self, _root: &Element) -> bool {
        true
    }

    fn find_elements(&self, window: &CapturedWindow, root: &Element) -> Vec<Element> {
        let mut out = Vec::new();
        self.walk_children(root.as_ref(), 1, &mut out);
        debug!(window = %window.id, found = out.len(), "tree_walk_done");
        out
    }
}

/// Finders exported by the host and plugins, in registration order.
#[derive(Default)]
pub struct FinderRegistry {
    finders: Vec<Arc<dyn ElementFinder>>,
}

impl FinderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered finders with those exported in `catalog`.
    pub fn load_finders(&mut self, catalog: &Catalog) {
        self.finders = catalog.finders().to_vec();
        debug!(finders = self.finders.len(), "finders_loaded");
    }

    /// Number of registered finders.
    pub fn len(&self) -> usize {
        self.finders.len()
    }

    /// True when no finder is registered.
    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }

    /// The first registered finder that accepts `root`, else the action's
    /// own default.
    pub fn select(&self, action: &dyn Action, root: &Element) -> Arc<dyn ElementFinder> {
        self.finders
            .iter()
            .find(|f| f.can_handle(root))
            .cloned()
            .unwrap_or_else(|| action.default_finder())
    }
}

#[cfg(test)]
mod tests {
    use win_keycode::Chord;
    use win_ops::{
        Rect, WindowId,
        mock::{MockNode, MockTree},
    };

    use super::*;
    use crate::plugin::{PluginError, PluginSource, Registrar};

    fn window() -> CapturedWindow {
        CapturedWindow {
            id: WindowId(1),
            rect: Rect::new(0.0, 0.0, 800.0, 600.0),
            dpi: 96,
        }
    }

    fn names(found: &[Element]) -> Vec<String> {
        found.iter().map(|e| e.name().unwrap()).collect()
    }

    fn find(tree: &MockTree) -> Vec<String> {
        names(&TreeWalkFinder::new().find_elements(&window(), &tree.root()))
    }

    fn button(name: &str) -> MockNode {
        MockNode::new(ControlType::Button, name)
    }

    fn pane(name: &str) -> MockNode {
        MockNode::new(ControlType::Pane, name)
    }

    #[test]
    fn preorder_in_native_child_order() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(button("a"))
            .child(
                pane("p")
                    .child(MockNode::new(ControlType::Hyperlink, "b"))
                    .child(MockNode::new(ControlType::Edit, "c")),
            )
            .child(MockNode::new(ControlType::TabItem, "d"))
            .build();
        assert_eq!(find(&tree), ["a", "b", "c", "d"]);
    }

    #[test]
    fn root_is_never_a_candidate() {
        let tree = button("root").child(button("a")).build();
        assert_eq!(find(&tree), ["a"]);
    }

    #[test]
    fn matched_nodes_still_recurse() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(
                MockNode::new(ControlType::List, "list")
                    .child(MockNode::new(ControlType::ListItem, "one"))
                    .child(MockNode::new(ControlType::ListItem, "two")),
            )
            .build();
        assert_eq!(find(&tree), ["list", "one", "two"]);
    }

    #[test]
    fn offscreen_subtree_is_pruned() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(pane("hidden").offscreen().child(button("inside")))
            .child(button("offscreen_button").offscreen())
            .child(button("visible"))
            .build();
        assert_eq!(find(&tree), ["visible"]);
    }

    #[test]
    fn non_targets_are_skipped() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Text, "label"))
            .child(MockNode::new(ControlType::Image, "logo"))
            .child(MockNode::new(ControlType::Other(123), "custom"))
            .child(button("ok"))
            .build();
        assert_eq!(find(&tree), ["ok"]);
    }

    #[test]
    fn depth_limit_stops_descent() {
        // Chain of panes: depth 1..=30, with a button hanging off every pane.
        let mut node = pane("p30").child(button("b31"));
        for d in (1..30).rev() {
            node = pane(&format!("p{d}"))
                .child(button(&format!("b{}", d + 1)))
                .child(node);
        }
        let tree = MockNode::new(ControlType::Window, "root").child(node).build();
        let found = find(&tree);
        assert_eq!(found.len(), 24);
        assert_eq!(found.first().map(String::as_str), Some("b2"));
        assert_eq!(found.last().map(String::as_str), Some("b25"));

        let shallow = TreeWalkFinder::new().with_max_depth(2);
        let found = names(&shallow.find_elements(&window(), &tree.root()));
        assert_eq!(found, ["b2"]);
    }

    #[test]
    fn unreadable_node_is_skipped_but_siblings_continue() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(button("a"))
            .child(button("broken").failing().child(button("child_of_broken")))
            .child(button("c"))
            .build();
        assert_eq!(find(&tree), ["a", "child_of_broken", "c"]);
    }

    #[test]
    fn failing_sibling_read_stops_the_run() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(
                pane("p")
                    .child(button("a"))
                    .child(button("b").failing_sibling())
                    .child(button("unreached")),
            )
            .child(button("after"))
            .build();
        assert_eq!(find(&tree), ["a", "b", "after"]);
    }

    #[test]
    fn custom_targets() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(button("a"))
            .child(MockNode::new(ControlType::Text, "t"))
            .build();
        let f = TreeWalkFinder::new().with_targets([ControlType::Text]);
        assert_eq!(names(&f.find_elements(&window(), &tree.root())), ["t"]);
    }

    struct Picky {
        accept: bool,
    }

    impl ElementFinder for Picky {
        fn can_handle(&self, _root: &Element) -> bool {
            self.accept
        }
        fn find_elements(&self, _w: &CapturedWindow, root: &Element) -> Vec<Element> {
            vec![root.clone()]
        }
    }

    struct Fallback(Arc<dyn ElementFinder>);

    impl Action for Fallback {
        fn name(&self) -> &str {
            "fallback"
        }
        fn default_chord(&self) -> Chord {
            Chord::parse("Win+F").unwrap()
        }
        fn default_finder(&self) -> Arc<dyn ElementFinder> {
            self.0.clone()
        }
        fn interact(&self, _w: &CapturedWindow, _e: &Element) -> win_ops::Result<()> {
            Ok(())
        }
    }

    struct Finders(Vec<Arc<dyn ElementFinder>>);

    impl PluginSource for Finders {
        fn name(&self) -> &str {
            "finders"
        }
        fn register(&self, r: &mut Registrar) -> Result<(), PluginError> {
            for f in &self.0 {
                r.finder(f.clone());
            }
            Ok(())
        }
    }

    #[test]
    fn select_prefers_first_accepting_finder() {
        let no: Arc<dyn ElementFinder> = Arc::new(Picky { accept: false });
        let yes1: Arc<dyn ElementFinder> = Arc::new(Picky { accept: true });
        let yes2: Arc<dyn ElementFinder> = Arc::new(Picky { accept: true });
        let default: Arc<dyn ElementFinder> = Arc::new(TreeWalkFinder::new());
        let action = Fallback(default.clone());
        let root = button("root").build().root();

        let mut reg = FinderRegistry::new();
        reg.load_finders(&Catalog::collect(&[&Finders(vec![
            no.clone(),
            yes1.clone(),
            yes2,
        ])]));
        assert_eq!(reg.len(), 3);
        assert!(Arc::ptr_eq(&reg.select(&action, &root), &yes1));

        reg.load_finders(&Catalog::collect(&[&Finders(vec![no])]));
        assert!(Arc::ptr_eq(&reg.select(&action, &root), &default));

        let empty = FinderRegistry::new();
        assert!(empty.is_empty());
        assert!(Arc::ptr_eq(&empty.select(&action, &root), &default));
    }
}
