//! Parse and load user configuration.

use std::{fs, io, path::Path};

use tracing::{debug, info, warn};

use crate::{Config, Error};

/// Parse a configuration from a JSON string. `path` is only used to annotate
/// errors.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<Config, Error> {
    serde_json::from_str::<Config>(source).map_err(|e| Error::parse(source, path, &e))
}

/// Load a `Config` from the JSON file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    load_from_str(&source, Some(path))
}

/// Load the config at `path`, falling back to defaults.
///
/// A missing file is the normal case and yields the defaults silently. An
/// unreadable or malformed file is logged and also yields the defaults, so a
/// bad config never prevents startup.
pub fn load_or_default(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(source) => match load_from_str(&source, Some(path)) {
            Ok(cfg) => {
                info!(path = %path.display(), actions = cfg.actions.len(), "config_loaded");
                cfg
            }
            Err(e) => {
                warn!(error = %e.pretty(), "config_invalid_using_defaults");
                Config::default()
            }
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config_missing_using_defaults");
            Config::default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config_unreadable_using_defaults");
            Config::default()
        }
    }
}
