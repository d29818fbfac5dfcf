//! Actions and the chord → action binding table.

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, info, warn};
use win_keycode::Chord;
use win_ops::{CapturedWindow, Element};

use crate::{finder::ElementFinder, plugin::Catalog};

/// A named, keyboard-triggered behavior applied to one labeled element.
pub trait Action: Send + Sync {
    /// Unique name; also the key for configuration overrides.
    fn name(&self) -> &str;

    /// Chord used when configuration does not override it.
    fn default_chord(&self) -> Chord;

    /// Finder used when no registered finder claims the window. Must accept
    /// every root. Implementations create it once and hand out clones.
    fn default_finder(&self) -> Arc<dyn ElementFinder>;

    /// Apply the action to `element` of `window`.
    fn interact(&self, window: &CapturedWindow, element: &Element) -> win_ops::Result<()>;
}

/// Registered actions plus the resolved binding table.
#[derive(Default)]
pub struct ActionRegistry {
    /// Registration order; a re-registered name keeps its original slot.
    actions: Vec<Arc<dyn Action>>,
    table: HashMap<Chord, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single action. The last registration of a name wins.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        match self.actions.iter().position(|a| a.name() == action.name()) {
            Some(i) => {
                debug!(action = action.name(), "action_replaced");
                self.actions[i] = action;
            }
            None => self.actions.push(action),
        }
    }

    /// Register every action in `catalog`, then resolve bindings against
    /// `config`.
    pub fn load_actions(&mut self, catalog: &Catalog, config: &config::Config) {
        for action in catalog.actions() {
            self.register(action.clone());
        }
        self.apply_config(config);
    }

    /// Rebuild the binding table from the registered actions and `config`.
    ///
    /// Disabled actions are left out. An unparsable binding keeps the default
    /// chord. When two actions resolve to the same chord the later one wins.
    pub fn apply_config(&mut self, config: &config::Config) {
        let mut table: HashMap<Chord, Arc<dyn Action>> = HashMap::new();
        for action in &self.actions {
            let Some(chord) = effective_chord(action.as_ref(), config) else {
                continue;
            };
            if let Some(prev) = table.insert(chord, action.clone()) {
                warn!(
                    chord = %chord,
                    replaced = prev.name(),
                    by = action.name(),
                    "binding_collision"
                );
            }
        }
        info!(bindings = table.len(), "bindings_resolved");
        self.table = table;
    }

    /// The action bound to `chord`, if any.
    pub fn try_resolve(&self, chord: &Chord) -> Option<Arc<dyn Action>> {
        self.table.get(chord).cloned()
    }

    /// All registered actions in registration order, bound or not.
    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    /// Snapshot of the binding table as `(chord, action name)`, sorted by
    /// chord.
    pub fn bindings(&self) -> Vec<(Chord, String)> {
        let mut out: Vec<(Chord, String)> = self
            .table
            .iter()
            .map(|(c, a)| (*c, a.name().to_string()))
            .collect();
        out.sort();
        out
    }

    /// Chords currently bound, for the keyboard hook.
    pub fn chords(&self) -> Vec<Chord> {
        self.bindings().into_iter().map(|(c, _)| c).collect()
    }
}

/// The chord an action binds to after config overrides, or `None` when disabled or unparsable.
fn effective_chord(action: &dyn Action, config: &config::Config) -> Option<Chord> {
    let default = action.default_chord();
    let Some(over) = config.action(action.name()) else {
        return Some(default);
    };
    if !over.enabled {
        debug!(action = action.name(), "action_disabled");
        return None;
    }
    match over.parsed_binding() {
        None => Some(default),
        Some(Ok(chord)) => Some(chord),
        Some(Err(e)) => {
            warn!(
                action = action.name(),
                binding = over.key_binding.as_deref().unwrap_or_default(),
                error = %e,
                default = %default,
                "invalid_key_binding"
            );
            Some(default)
        }
    }
}
