//! Actions that ship with the host.

use std::sync::Arc;

use tracing::debug;
use win_keycode::{Chord, Key, Modifiers};
use win_ops::{CapturedWindow, Describe, Element, Error as OpsError, WinOps};

use crate::{
    action::Action,
    finder::{ElementFinder, TreeWalkFinder},
    plugin::{PluginError, PluginSource, Registrar},
};

/// Name of the click action, as used in configuration.
pub const CLICK: &str = "Click";
/// Name of the invoke action, as used in configuration.
pub const INVOKE: &str = "Invoke";

/// Register the built-in actions.
pub fn register(registrar: &mut Registrar, ops: Arc<dyn WinOps>) {
    registrar.action(Arc::new(ClickAction::new(ops.clone())));
    registrar.action(Arc::new(InvokeAction::new(ops)));
}

/// The built-ins as a plugin source, so the host registers them the same way
/// as any other source.
pub struct Builtins {
    ops: Arc<dyn WinOps>,
}

impl Builtins {
    /// Built-ins acting through `ops`.
    pub fn new(ops: Arc<dyn WinOps>) -> Self {
        Self { ops }
    }
}

impl PluginSource for Builtins {
    fn name(&self) -> &str {
        "builtin"
    }

    fn register(&self, registrar: &mut Registrar) -> Result<(), PluginError> {
        register(registrar, self.ops.clone());
        Ok(())
    }
}

/// Bring the window forward and click the centre of `element`.
fn click_center(
    ops: &dyn WinOps,
    window: &CapturedWindow,
    element: &Element,
) -> win_ops::Result<()> {
    let bounds = element.bounds()?;
    if bounds.is_degenerate() {
        return Err(OpsError::NotSupported("click on empty bounds"));
    }
    ops.activate_window(window.id);
    let at = bounds.center();
    debug!(element = %Describe(element.as_ref()), x = at.x, y = at.y, "click");
    ops.send_click(at)
}

/// Clicks the centre of the element.
pub struct ClickAction {
    ops: Arc<dyn WinOps>,
    finder: Arc<dyn ElementFinder>,
}

impl ClickAction {
    /// Click action acting through `ops`.
    pub fn new(ops: Arc<dyn WinOps>) -> Self {
        Self {
            ops,
            finder: Arc::new(TreeWalkFinder::new()),
        }
    }
}

impl Action for ClickAction {
    fn name(&self) -> &str {
        CLICK
    }

    fn default_chord(&self) -> Chord {
        Chord::new(Modifiers::WIN, Key::F)
    }

    fn default_finder(&self) -> Arc<dyn ElementFinder> {
        self.finder.clone()
    }

    fn interact(&self, window: &CapturedWindow, element: &Element) -> win_ops::Result<()> {
        click_center(self.ops.as_ref(), window, element)
    }
}

/// Invokes the element's default action, falling back to a click for
/// elements without one.
pub struct InvokeAction {
    ops: Arc<dyn WinOps>,
    finder: Arc<dyn ElementFinder>,
}

impl InvokeAction {
    /// Invoke action acting through `ops`.
    pub fn new(ops: Arc<dyn WinOps>) -> Self {
        Self {
            ops,
            finder: Arc::new(TreeWalkFinder::new()),
        }
    }
}

impl Action for InvokeAction {
    fn name(&self) -> &str {
        INVOKE
    }

    fn default_chord(&self) -> Chord {
        Chord::new(Modifiers::WIN | Modifiers::SHIFT, Key::F)
    }

    fn default_finder(&self) -> Arc<dyn ElementFinder> {
        self.finder.clone()
    }

    fn interact(&self, window: &CapturedWindow, element: &Element) -> win_ops::Result<()> {
        if element.can_invoke() {
            debug!(element = %Describe(element.as_ref()), "invoke");
            return element.invoke();
        }
        click_center(self.ops.as_ref(), window, element)
    }
}

#[cfg(test)]
mod tests {
    use win_ops::{
        ControlType, Point, Rect, WindowId,
        mock::{MockNode, MockWinOps},
    };

    use super::*;
    use crate::plugin::Catalog;

    fn window() -> CapturedWindow {
        CapturedWindow {
            id: WindowId(7),
            rect: Rect::new(0.0, 0.0, 800.0, 600.0),
            dpi: 96,
        }
    }

    #[test]
    fn builtins_register_click_and_invoke() {
        let ops = Arc::new(MockWinOps::new());
        let catalog = Catalog::collect(&[&Builtins::new(ops)]);
        let names: Vec<&str> = catalog.actions().iter().map(|a| a.name()).collect();
        assert_eq!(names, [CLICK, INVOKE]);
        assert!(catalog.finders().is_empty());
        assert_eq!(catalog.actions()[0].default_chord().to_string(), "Win+F");
        assert_eq!(catalog.actions()[1].default_chord().to_string(), "Shift+Win+F");
    }

    #[test]
    fn default_finder_is_created_once() {
        let click = ClickAction::new(Arc::new(MockWinOps::new()));
        assert!(Arc::ptr_eq(&click.default_finder(), &click.default_finder()));
    }

    #[test]
    fn click_targets_center_after_activating() {
        let ops = Arc::new(MockWinOps::new());
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "ok").bounds(100.0, 50.0, 40.0, 20.0))
            .build();
        let ok = tree.root().first_child().unwrap().unwrap();
        ClickAction::new(ops.clone()).interact(&window(), &ok).unwrap();
        assert_eq!(ops.clicks(), vec![Point::new(120.0, 60.0)]);
        assert_eq!(ops.activations(), vec![WindowId(7)]);
    }

    #[test]
    fn click_on_stale_element_fails_without_clicking() {
        let ops = Arc::new(MockWinOps::new());
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "ok"))
            .build();
        let ok = tree.root().first_child().unwrap().unwrap();
        tree.set_stale("ok");
        let err = ClickAction::new(ops.clone()).interact(&window(), &ok).unwrap_err();
        assert_eq!(err, OpsError::StaleElement);
        assert!(ops.clicks().is_empty());
    }

    #[test]
    fn invoke_prefers_pattern_then_falls_back_to_click() {
        let ops = Arc::new(MockWinOps::new());
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "inv").invokable())
            .child(MockNode::new(ControlType::Edit, "plain").bounds(0.0, 0.0, 10.0, 10.0))
            .build();
        let inv = tree.root().first_child().unwrap().unwrap();
        let plain = inv.next_sibling().unwrap().unwrap();
        let action = InvokeAction::new(ops.clone());

        action.interact(&window(), &inv).unwrap();
        assert_eq!(tree.invocations("inv"), 1);
        assert!(ops.clicks().is_empty());

        action.interact(&window(), &plain).unwrap();
        assert_eq!(ops.clicks(), vec![Point::new(5.0, 5.0)]);
    }
}
