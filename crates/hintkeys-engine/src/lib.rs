//! Hintkeys Engine
//!
//! The engine turns global chords into hint sessions:
//! - resolves a chord to a registered [`Action`](action::Action)
//! - captures the foreground window and labels its interactive elements
//! - reads the typed label from the overlay and runs the action on the match
//!
//! Everything that touches the OS goes through [`Services`], so the whole flow
//! runs against mocks in tests. The engine is driven by [`UiEvent`]s on a
//! single task; at most one session is active at a time.
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, trace, warn};
use win_keycode::Chord;
use win_ops::{OverlayInput, WindowId};

pub mod action;
pub mod builtin;
pub mod controller;
mod error;
pub mod finder;
pub mod labels;
pub mod plugin;
mod services;
pub mod ticker;

pub use controller::{OverlayController, Phase, SELECT_DELAY};
pub use error::{Error, Result};
pub use services::Services;

use action::ActionRegistry;

/// Events consumed by the engine loop.
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    /// A bound chord was pressed while `foreground` was in front.
    Hotkey {
        /// The chord as matched by the hook.
        chord: Chord,
        /// Foreground window at press time, if the hook could read it.
        foreground: Option<WindowId>,
    },
    /// Input from the overlay opened by `session`.
    Overlay {
        /// Session that owns the overlay.
        session: u64,
        /// What was typed.
        input: OverlayInput,
    },
    /// Selection deadline for `session` at text `generation`.
    Timer {
        /// Session that armed the timer.
        session: u64,
        /// Text generation the timer belongs to.
        generation: u64,
    },
    /// Stop the loop.
    Shutdown,
}

/// Owns the binding table and the active session.
pub struct Engine {
    registry: ActionRegistry,
    services: Services,
    tx: UnboundedSender<UiEvent>,
    rx: UnboundedReceiver<UiEvent>,
    active: Option<OverlayController>,
    next_session: u64,
}

impl Engine {
    /// Create an engine with its own event channel.
    pub fn new(registry: ActionRegistry, services: Services) -> Self {
        Self::with_channel(registry, services, unbounded_channel())
    }

    /// Create an engine around an existing channel, for hosts that must hand
    /// out senders before the services exist.
    pub fn with_channel(
        registry: ActionRegistry,
        services: Services,
        (tx, rx): (UnboundedSender<UiEvent>, UnboundedReceiver<UiEvent>),
    ) -> Self {
        Self {
            registry,
            services,
            tx,
            rx,
            active: None,
            next_session: 1,
        }
    }

    /// Sender for feeding events from hooks and the overlay host.
    pub fn sender(&self) -> UnboundedSender<UiEvent> {
        self.tx.clone()
    }

    /// The binding table.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Id and phase of the active session.
    pub fn active_session(&self) -> Option<(u64, Phase)> {
        self.active.as_ref().map(|c| (c.session(), c.phase()))
    }

    /// The active session's controller.
    pub fn active(&self) -> Option<&OverlayController> {
        self.active.as_ref()
    }

    /// Process one event. Returns false once the engine should stop.
    pub fn handle(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::Hotkey { chord, foreground } => self.on_hotkey(chord, foreground),
            UiEvent::Overlay { session, input } => {
                if let Some(c) = self.session_mut(session) {
                    c.handle_input(input);
                } else {
                    trace!(session, ?input, "stale_overlay_input");
                }
            }
            UiEvent::Timer {
                session,
                generation,
            } => {
                if let Some(c) = self.session_mut(session) {
                    c.on_timer(generation);
                } else {
                    trace!(session, generation, "stale_timer");
                }
            }
            UiEvent::Shutdown => {
                info!("engine_shutdown");
                self.end_active();
                return false;
            }
        }
        self.reap();
        true
    }

    /// Wait for and process the next event. Returns false on shutdown or when
    /// every sender is gone.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Some(event) => self.handle(event),
            None => {
                self.end_active();
                false
            }
        }
    }

    /// Run until shutdown.
    pub async fn run(&mut self) {
        info!(bindings = self.registry.bindings().len(), "engine_started");
        while self.step().await {}
    }

    /// Start a session for `chord`, replacing any active one.
    fn on_hotkey(&mut self, chord: Chord, foreground: Option<WindowId>) {
        let Some(action) = self.registry.try_resolve(&chord) else {
            debug!(chord = %chord, "unbound_chord");
            return;
        };
        let foreground = self.look_past_overlay(foreground);
        if let Some(prev) = self.active.as_ref() {
            info!(session = prev.session(), "session_replaced");
        }
        self.end_active();

        let session = self.next_session;
        self.next_session += 1;
        info!(session, chord = %chord, action = action.name(), "session_begin");
        let mut controller =
            OverlayController::new(session, action, self.services.clone(), self.tx.clone());
        match controller.start(foreground) {
            Ok(()) => self.active = Some(controller),
            Err(e) => warn!(session, error = %e, "session_aborted"),
        }
    }

    /// With our own overlay in front, the window it covers is the real target.
    fn look_past_overlay(&self, foreground: Option<WindowId>) -> Option<WindowId> {
        let fg = foreground?;
        if !self.services.surface.owns_window(fg) {
            return Some(fg);
        }
        let covered = self.active.as_ref().and_then(|c| c.window()).map(|w| w.id);
        debug!(overlay = %fg, covered = ?covered, "foreground_is_overlay");
        covered
    }

    /// The active controller, if it belongs to `session`.
    fn session_mut(&mut self, session: u64) -> Option<&mut OverlayController> {
        self.active.as_mut().filter(|c| c.session() == session)
    }

    /// Cancel and drop the active session.
    fn end_active(&mut self) {
        if let Some(mut c) = self.active.take() {
            c.cancel();
        }
    }

    /// Drop a session that reached a terminal phase.
    fn reap(&mut self) {
        if self.active.as_ref().is_some_and(|c| c.phase().is_terminal()) {
            self.active = None;
        }
    }
}

/// Build the engine's finder registry and binding table from plugin sources.
pub fn assemble(
    sources: &[&dyn plugin::PluginSource],
    config: &config::Config,
) -> (ActionRegistry, finder::FinderRegistry) {
    let catalog = plugin::Catalog::collect(sources);
    let mut finders = finder::FinderRegistry::new();
    finders.load_finders(&catalog);
    let mut registry = ActionRegistry::new();
    registry.load_actions(&catalog, config);
    (registry, finders)
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.end_active();
    }
}

