use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the hintkeys engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Errors from the window, accessibility or overlay layer.
    #[error("Window operation failed: {0}")]
    Ops(#[from] win_ops::Error),

    /// No window was in the foreground when the hotkey fired.
    #[error("No foreground window")]
    NoForegroundWindow,
}
