//! Configuration data types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use win_keycode::{Chord, ParseError};

/// Per-action override record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Replacement chord string, e.g. `"Win+Shift+G"`. Blank means "keep the
    /// default".
    #[serde(rename = "keyBinding", default, skip_serializing_if = "Option::is_none")]
    pub key_binding: Option<String>,
    /// When false the action gets no binding at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Actions are enabled unless the config says otherwise.
fn default_enabled() -> bool {
    true
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            key_binding: None,
            enabled: true,
        }
    }
}

impl ActionConfig {
    /// Parse the configured key binding. Returns `None` when no binding is set
    /// or it is blank.
    pub fn parsed_binding(&self) -> Option<Result<Chord, ParseError>> {
        let raw = self.key_binding.as_deref()?;
        if raw.trim().is_empty() {
            return None;
        }
        Some(Chord::parse(raw))
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Overrides keyed by action name. Names are matched exactly.
    #[serde(default)]
    pub actions: HashMap<String, ActionConfig>,
}

impl Config {
    /// Look up the override record for an action.
    pub fn action(&self, name: &str) -> Option<&ActionConfig> {
        self.actions.get(name)
    }

    /// Builder-style helper to set an override record.
    pub fn with_action(mut self, name: impl Into<String>, cfg: ActionConfig) -> Self {
        self.actions.insert(name.into(), cfg);
        self
    }
}
