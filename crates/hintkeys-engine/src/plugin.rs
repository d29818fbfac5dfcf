//! Plugin registration.
//!
//! Every source of actions and finders (the host's built-ins, and any
//! extension compiled into the binary) exposes a registration function
//! through [`PluginSource`]. Sources are collected once at startup into a
//! [`Catalog`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{action::Action, finder::ElementFinder};

/// Failure reported by a plugin source during registration.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The source could not construct one of its components.
    #[error("failed to construct {component}: {message}")]
    Construct {
        /// Component that failed.
        component: String,
        /// Reason.
        message: String,
    },

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Collects what one source registers.
#[derive(Default)]
pub struct Registrar {
    actions: Vec<Arc<dyn Action>>,
    finders: Vec<Arc<dyn ElementFinder>>,
}

impl Registrar {
    /// Register an action.
    pub fn action(&mut self, action: Arc<dyn Action>) {
        self.actions.push(action);
    }

    /// Export a finder to the shared finder registry.
    pub fn finder(&mut self, finder: Arc<dyn ElementFinder>) {
        self.finders.push(finder);
    }
}

/// A named provider of actions and finders.
pub trait PluginSource {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Register this source's components.
    fn register(&self, registrar: &mut Registrar) -> Result<(), PluginError>;
}

/// Everything registered by all sources, in source order.
#[derive(Default)]
pub struct Catalog {
    actions: Vec<Arc<dyn Action>>,
    finders: Vec<Arc<dyn ElementFinder>>,
}

impl Catalog {
    /// Run every source in order. A source that fails contributes nothing and
    /// does not stop the others.
    pub fn collect(sources: &[&dyn PluginSource]) -> Self {
        let mut catalog = Self::default();
        for source in sources {
            let mut registrar = Registrar::default();
            match source.register(&mut registrar) {
                Ok(()) => {
                    info!(
                        source = source.name(),
                        actions = registrar.actions.len(),
                        finders = registrar.finders.len(),
                        "plugin_registered"
                    );
                    catalog.actions.extend(registrar.actions);
                    catalog.finders.extend(registrar.finders);
                }
                Err(e) => warn!(source = source.name(), error = %e, "plugin_failed"),
            }
        }
        catalog
    }

    /// Registered actions.
    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    /// Exported finders.
    pub fn finders(&self) -> &[Arc<dyn ElementFinder>] {
        &self.finders
    }
}
