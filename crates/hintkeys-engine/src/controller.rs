//! One hint session, from capture to execution or cancellation.

use std::{fmt, sync::Arc, time::Duration};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, trace, warn};
use win_ops::{CapturedWindow, Describe, Element, HintMark, OverlayInput, OverlayPlan, WindowId};

use crate::{Error, Result, UiEvent, action::Action, labels, services::Services, ticker::Ticker};

/// How long a complete, valid label must stay unchanged before it executes.
pub const SELECT_DELAY: Duration = Duration::from_millis(500);

/// Session phases. `Executing` and `Cancelled` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Resolving the target window.
    Capturing,
    /// Discovering and labeling elements.
    Labeling,
    /// Overlay shown, reading the label.
    AwaitingInput,
    /// An element was chosen; the action ran or is running.
    Executing,
    /// Dismissed without running the action.
    Cancelled,
}

impl Phase {
    /// True for `Executing` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Executing | Self::Cancelled)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Capturing => "capturing",
            Self::Labeling => "labeling",
            Self::AwaitingInput => "awaiting_input",
            Self::Executing => "executing",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A found element and the label it was given, if any.
struct Target {
    element: Element,
    /// `None` when the element's bounds were unreadable or degenerate.
    label: Option<String>,
}

/// Drives one overlay session.
///
/// Labels are assigned by discovery index, so an element that cannot be
/// labeled leaves a gap: the next labeled element keeps its own index.
pub struct OverlayController {
    session: u64,
    action: Arc<dyn Action>,
    services: Services,
    events: UnboundedSender<UiEvent>,
    window: Option<CapturedWindow>,
    targets: Vec<Target>,
    text: String,
    /// Bumped on every text change; a timer only fires for its own generation.
    generation: u64,
    phase: Phase,
    timer: Ticker,
}

impl OverlayController {
    /// A session in the `Capturing` phase. Timer expiries are posted to
    /// `events`.
    pub fn new(
        session: u64,
        action: Arc<dyn Action>,
        services: Services,
        events: UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            session,
            action,
            services,
            events,
            window: None,
            targets: Vec::new(),
            text: String::new(),
            generation: 0,
            phase: Phase::Capturing,
            timer: Ticker::new(),
        }
    }

    /// Capture the window, label its elements and open the overlay.
    ///
    /// `foreground` is the window that was in front when the chord fired;
    /// the current foreground window is used only when it is missing. On
    /// error the session ends `Cancelled`.
    pub fn start(&mut self, foreground: Option<WindowId>) -> Result<()> {
        let res = self.try_start(foreground);
        if let Err(e) = &res {
            warn!(session = self.session, phase = %self.phase, error = %e, "session_start_failed");
            self.phase = Phase::Cancelled;
        }
        res
    }

    /// Capture, label and open the overlay; any error aborts the session.
    fn try_start(&mut self, foreground: Option<WindowId>) -> Result<()> {
        let ops = self.services.ops.clone();
        let id = foreground
            .or_else(|| ops.foreground_window())
            .ok_or(Error::NoForegroundWindow)?;
        let window = ops.capture_window(id)?;
        debug!(session = self.session, window = %window.id, dpi = window.dpi, "window_captured");
        self.window = Some(window);

        self.phase = Phase::Labeling;
        let root = ops.root_element(&window)?;
        let finder = self.services.finders.select(self.action.as_ref(), &root);
        let elements = finder.find_elements(&window, &root);
        let plan = self.label(&window, elements);
        info!(
            session = self.session,
            action = self.action.name(),
            elements = self.targets.len(),
            labeled = plan.marks.len(),
            "session_labeled"
        );

        self.services.surface.open(self.session, &plan)?;
        self.phase = Phase::AwaitingInput;
        Ok(())
    }

    /// Assign labels by discovery index and build the overlay plan.
    fn label(&mut self, window: &CapturedWindow, elements: Vec<Element>) -> OverlayPlan {
        let origin = window.origin();
        let mut marks = Vec::new();
        self.targets = elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let label = match element.bounds() {
                    Ok(b) if !b.is_degenerate() => {
                        let label = labels::encode(index);
                        marks.push(HintMark {
                            label: label.clone(),
                            bounds: b.relative_to(origin).to_logical(window.dpi),
                        });
                        Some(label)
                    }
                    Ok(b) => {
                        debug!(
                            index,
                            element = %Describe(element.as_ref()),
                            ?b,
                            "degenerate_bounds"
                        );
                        None
                    }
                    Err(e) => {
                        debug!(index, error = %e, "bounds_unreadable");
                        None
                    }
                };
                Target { element, label }
            })
            .collect();
        OverlayPlan {
            frame: window.logical_rect(),
            dpi: window.dpi,
            marks,
        }
    }

    /// Feed one overlay input. Ignored outside `AwaitingInput`.
    pub fn handle_input(&mut self, input: OverlayInput) {
        if self.phase != Phase::AwaitingInput {
            trace!(session = self.session, ?input, phase = %self.phase, "input_ignored");
            return;
        }
        match input {
            OverlayInput::Char(c) => {
                if let Some(OverlayInput::Char(c)) = OverlayInput::from_char(c) {
                    self.text.push(c.to_ascii_uppercase());
                    self.text_changed();
                }
            }
            OverlayInput::Backspace => {
                if self.text.pop().is_some() {
                    self.text_changed();
                }
            }
            OverlayInput::Enter => {
                if self.selected().is_some() {
                    self.execute();
                } else {
                    debug!(session = self.session, text = %self.text, "enter_without_match");
                }
            }
            OverlayInput::Escape | OverlayInput::FocusLost => {
                debug!(session = self.session, ?input, "session_dismissed");
                self.cancel();
            }
        }
    }

    /// Echo the new text and re-arm the selection deadline.
    fn text_changed(&mut self) {
        self.timer.cancel();
        self.generation += 1;
        if let Err(e) = self.services.surface.set_text(self.session, &self.text) {
            debug!(session = self.session, error = %e, "echo_failed");
        }
        if self.selected().is_none() {
            return;
        }
        let (session, generation) = (self.session, self.generation);
        let events = self.events.clone();
        self.timer.start(SELECT_DELAY, move || {
            if events.send(UiEvent::Timer { session, generation }).is_err() {
                trace!(session, "timer_receiver_gone");
            }
        });
        trace!(session, generation, text = %self.text, "select_timer_armed");
    }

    /// Timer expiry for `generation`. Stale generations are ignored.
    pub fn on_timer(&mut self, generation: u64) {
        if self.phase != Phase::AwaitingInput || generation != self.generation {
            trace!(session = self.session, generation, "stale_timer");
            return;
        }
        if self.selected().is_some() {
            self.execute();
        }
    }

    /// Dismiss the session. Idempotent.
    pub fn cancel(&mut self) {
        self.finish(Phase::Cancelled);
    }

    /// Close the overlay, then run the action on the selected target.
    fn execute(&mut self) {
        let Some(index) = self.selected() else {
            return;
        };
        if !self.finish(Phase::Executing) {
            return;
        }
        let Some(window) = self.window else {
            return;
        };
        let target = &self.targets[index];
        info!(
            session = self.session,
            action = self.action.name(),
            label = target.label.as_deref().unwrap_or_default(),
            "session_execute"
        );
        if let Err(e) = self.action.interact(&window, &target.element) {
            warn!(
                session = self.session,
                action = self.action.name(),
                error = %e,
                "interact_failed"
            );
        }
    }

    /// Enter a terminal phase: cancel the timer, then close the overlay.
    /// Returns false if the session had already ended.
    fn finish(&mut self, phase: Phase) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.timer.cancel();
        let was_open = self.phase == Phase::AwaitingInput;
        self.phase = phase;
        if was_open {
            if let Err(e) = self.services.surface.close(self.session) {
                debug!(session = self.session, error = %e, "overlay_close_failed");
            }
        }
        debug!(session = self.session, phase = %phase, "session_finished");
        true
    }

    /// Index of the labeled element named by the current text.
    fn selected(&self) -> Option<usize> {
        let index = labels::decode(&self.text)?;
        self.targets.get(index)?.label.as_ref()?;
        Some(index)
    }

    /// Session id.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Typed text, uppercased.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Label per discovered element, in discovery order.
    pub fn labels(&self) -> Vec<Option<&str>> {
        self.targets.iter().map(|t| t.label.as_deref()).collect()
    }

    /// The captured window, once known.
    pub fn window(&self) -> Option<&CapturedWindow> {
        self.window.as_ref()
    }

    /// True while a selection deadline is armed.
    pub fn timer_armed(&self) -> bool {
        self.timer.is_active()
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;
    use win_ops::{
        ControlType, Error as OpsError, Point, Rect,
        mock::{MockNode, MockOverlay, MockTree, MockWinOps, OverlayCall},
    };

    use super::*;
    use crate::{builtin::ClickAction, finder::FinderRegistry};

    struct Fixture {
        ops: Arc<MockWinOps>,
        overlay: Arc<MockOverlay>,
        services: Services,
    }

    fn fixture(window: CapturedWindow, tree: MockTree) -> Fixture {
        let ops = Arc::new(MockWinOps::new());
        ops.add_window(window, Some(tree));
        ops.set_foreground(Some(window.id));
        let overlay = Arc::new(MockOverlay::new());
        let services = Services {
            ops: ops.clone(),
            surface: overlay.clone(),
            finders: Arc::new(FinderRegistry::new()),
        };
        Fixture {
            ops,
            overlay,
            services,
        }
    }

    fn controller(f: &Fixture) -> OverlayController {
        let (tx, _rx) = unbounded_channel();
        let action = Arc::new(ClickAction::new(f.ops.clone()));
        OverlayController::new(1, action, f.services.clone(), tx)
    }

    fn win(dpi: u32) -> CapturedWindow {
        CapturedWindow {
            id: WindowId(0x10),
            rect: Rect::new(200.0, 100.0, 960.0, 720.0),
            dpi,
        }
    }

    #[test]
    fn plan_is_logical_and_window_relative() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "a").bounds(260.0, 160.0, 30.0, 15.0))
            .build();
        let f = fixture(win(144), tree);
        let mut c = controller(&f);
        c.start(None).unwrap();
        assert_eq!(c.phase(), Phase::AwaitingInput);
        let plan = f.overlay.last_plan().unwrap();
        assert_eq!(plan.dpi, 144);
        assert_eq!(plan.frame, Rect::new(200.0 / 1.5, 100.0 / 1.5, 640.0, 480.0));
        assert_eq!(plan.marks.len(), 1);
        assert_eq!(plan.marks[0].label, "A");
        assert_eq!(plan.marks[0].bounds, Rect::new(40.0, 40.0, 20.0, 10.0));
    }

    #[test]
    fn unlabelable_elements_leave_gaps() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "a").bounds(210.0, 110.0, 10.0, 10.0))
            .child(MockNode::new(ControlType::Button, "empty").bounds(0.0, 0.0, 0.0, 10.0))
            .child(MockNode::new(ControlType::Button, "nan").bounds(f64::NAN, 0.0, 5.0, 5.0))
            .child(MockNode::new(ControlType::Button, "d").bounds(230.0, 110.0, 10.0, 10.0))
            .build();
        let f = fixture(win(96), tree);
        let mut c = controller(&f);
        c.start(None).unwrap();
        assert_eq!(c.labels(), vec![Some("A"), None, None, Some("D")]);
        let marks: Vec<String> = f
            .overlay
            .last_plan()
            .unwrap()
            .marks
            .into_iter()
            .map(|m| m.label)
            .collect();
        assert_eq!(marks, ["A", "D"]);
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_bounds_leave_a_gap_and_keep_order() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "a").bounds(210.0, 110.0, 10.0, 10.0))
            .child(
                MockNode::new(ControlType::Button, "gone")
                    .bounds(230.0, 110.0, 10.0, 10.0)
                    .failing_bounds(),
            )
            .child(MockNode::new(ControlType::Button, "c").bounds(250.0, 110.0, 10.0, 10.0))
            .build();
        let f = fixture(win(96), tree);
        let mut c = controller(&f);
        c.start(None).unwrap();
        assert_eq!(c.labels(), vec![Some("A"), None, Some("C")]);
        assert_eq!(f.overlay.last_plan().unwrap().marks.len(), 2);

        c.handle_input(OverlayInput::Char('c'));
        c.handle_input(OverlayInput::Enter);
        assert_eq!(c.phase(), Phase::Executing);
        assert_eq!(f.ops.clicks(), vec![Point::new(255.0, 115.0)]);
    }

    #[test]
    fn captured_foreground_wins_over_current() {
        let tree = MockNode::new(ControlType::Window, "root").build();
        let f = fixture(win(96), tree);
        f.ops.set_foreground(Some(WindowId(0x99)));
        let mut c = controller(&f);
        c.start(Some(WindowId(0x10))).unwrap();
        assert_eq!(c.window().map(|w| w.id), Some(WindowId(0x10)));
        assert!(!f.ops.calls_contains("foreground_window"));
    }

    #[test]
    fn missing_window_cancels_without_overlay() {
        let tree = MockNode::new(ControlType::Window, "root").build();
        let f = fixture(win(96), tree);
        f.ops.set_foreground(None);
        let mut c = controller(&f);
        assert!(matches!(c.start(None), Err(Error::NoForegroundWindow)));
        assert_eq!(c.phase(), Phase::Cancelled);

        let mut c = controller(&f);
        f.ops.remove_window(WindowId(0x10));
        assert!(matches!(
            c.start(Some(WindowId(0x10))),
            Err(Error::Ops(OpsError::WindowGone))
        ));
        assert!(f.overlay.calls().is_empty());
    }

    #[test]
    fn input_is_ignored_after_terminal_phase() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "a").bounds(210.0, 110.0, 10.0, 10.0))
            .build();
        let f = fixture(win(96), tree);
        let mut c = controller(&f);
        c.start(None).unwrap();
        c.handle_input(OverlayInput::Escape);
        c.handle_input(OverlayInput::FocusLost);
        c.handle_input(OverlayInput::Char('a'));
        c.handle_input(OverlayInput::Enter);
        c.cancel();
        assert_eq!(c.phase(), Phase::Cancelled);
        let closes = f
            .overlay
            .calls()
            .into_iter()
            .filter(|call| matches!(call, OverlayCall::Close { .. }))
            .count();
        assert_eq!(closes, 1);
        assert!(f.ops.clicks().is_empty());
    }

    #[test]
    fn non_letters_are_rejected_and_backspace_edits() {
        let tree = MockNode::new(ControlType::Window, "root")
            .child(MockNode::new(ControlType::Button, "a").bounds(210.0, 110.0, 10.0, 10.0))
            .build();
        let f = fixture(win(96), tree);
        let mut c = controller(&f);
        c.start(None).unwrap();
        c.handle_input(OverlayInput::Char('1'));
        assert_eq!(c.text(), "");
        c.handle_input(OverlayInput::Char('q'));
        c.handle_input(OverlayInput::Char('z'));
        assert_eq!(c.text(), "QZ");
        c.handle_input(OverlayInput::Backspace);
        assert_eq!(c.text(), "Q");
        assert_eq!(f.overlay.last_text().as_deref(), Some("Q"));
        c.handle_input(OverlayInput::Backspace);
        c.handle_input(OverlayInput::Backspace);
        assert_eq!(c.text(), "");
    }
}
