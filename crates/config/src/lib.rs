//! User configuration for hintkeys.
//!
//! The configuration is a small JSON document mapping action names to
//! optional overrides:
//!
//! ```json
//! {
//!   "actions": {
//!     "Click": { "keyBinding": "Ctrl+Alt+F" },
//!     "Invoke": { "enabled": false }
//!   }
//! }
//! ```
//!
//! A missing file or a missing action entry means "use the defaults".

use std::{
    env,
    path::{Path, PathBuf},
};

mod error;
mod loader;
mod types;

#[cfg(test)]
mod test_parse;

pub use error::{Error, ParseKind};
pub use loader::{load_from_path, load_from_str, load_or_default};
pub use types::{ActionConfig, Config};

/// File name of the user configuration inside the home directory.
pub const CONFIG_FILE_NAME: &str = ".hintkeys.json";

/// Determine the user config path (`~/.hintkeys.json`).
///
/// Uses `USERPROFILE` when set (Windows), else `HOME`.
pub fn default_config_path() -> PathBuf {
    let home = env::var_os("USERPROFILE")
        .or_else(|| env::var_os("HOME"))
        .unwrap_or_default();
    let mut p = PathBuf::from(home);
    p.push(CONFIG_FILE_NAME);
    p
}

/// Resolve the effective config path: `explicit` when provided, else the
/// default location. The returned path need not exist.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => default_config_path(),
    }
}
