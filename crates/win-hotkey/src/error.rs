//! Error types and result alias for the win-hotkey crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Error variants produced by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying OS provided an error.
    #[error("OS error: {0}")]
    OsError(String),
    /// The low-level keyboard hook could not be installed.
    #[error("keyboard hook failed to install: {0}")]
    HookInstall(String),
    /// A listener is already running in this process. Windows delivers
    /// low-level hook callbacks through process-wide state, so only one
    /// listener may be active at a time.
    #[error("a hotkey listener is already running")]
    AlreadyRunning,
    /// The hook thread exited before reporting readiness.
    #[error("hook thread exited unexpectedly")]
    ThreadExited,
    /// Global keyboard hooks are not available on this platform.
    #[error("global keyboard hooks are only supported on Windows")]
    Unsupported,
}
