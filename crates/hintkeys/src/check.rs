//! `hintkeys check`: load the configuration and show what each action is
//! bound to.
use std::{path::Path, sync::Arc};

use config::Config;
use hintkeys_engine::action::ActionRegistry;
use serde_json::{Value, json};
use tracing::debug;
use win_ops::RealWinOps;

use crate::{Result, assemble};

/// Load `path` (defaults when missing) and render the binding table.
pub fn run(path: &Path, dump: bool) -> Result<String> {
    let config = if path.exists() {
        config::load_from_path(path)?
    } else {
        debug!(path = %path.display(), "config_missing_using_defaults");
        Config::default()
    };
    let (registry, _) = assemble(&config, Arc::new(RealWinOps));
    if dump { dump_json(&registry) } else { Ok(table(&registry)) }
}

/// One row per registered action with its chord, `None` when unbound.
fn rows(registry: &ActionRegistry) -> Vec<(String, Option<String>)> {
    let bindings = registry.bindings();
    registry
        .actions()
        .iter()
        .map(|a| {
            let chord = bindings
                .iter()
                .find(|(_, name)| name == a.name())
                .map(|(c, _)| c.to_string());
            (a.name().to_string(), chord)
        })
        .collect()
}

/// Render the binding table as aligned text.
fn table(registry: &ActionRegistry) -> String {
    rows(registry)
        .into_iter()
        .map(|(name, chord)| {
            let chord = chord.unwrap_or_else(|| "(unbound)".into());
            format!("{chord:<16} {name}\n")
        })
        .collect()
}

/// Render the binding table as JSON.
fn dump_json(registry: &ActionRegistry) -> Result<String> {
    let rows: Vec<Value> = rows(registry)
        .into_iter()
        .map(|(action, chord)| json!({ "action": action, "chord": chord }))
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}
