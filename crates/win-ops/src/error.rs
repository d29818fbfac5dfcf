use std::result::Result as StdResult;

use thiserror::Error;

/// Errors that can occur during window, accessibility or overlay operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The accessibility element no longer exists (its UI went away).
    #[error("accessibility element is no longer available")]
    StaleElement,

    /// The target window was closed or its handle is invalid.
    #[error("window gone")]
    WindowGone,

    /// There is no foreground window to act on.
    #[error("no foreground window")]
    NoForegroundWindow,

    /// The element does not support the requested operation.
    #[error("operation not supported by element: {0}")]
    NotSupported(&'static str),

    /// The overlay host thread is not running.
    #[error("overlay host is not running")]
    OverlayUnavailable,

    /// An OS call failed.
    #[error("{op} failed: {message}")]
    Os {
        /// Logical operation name.
        op: &'static str,
        /// OS-provided error text.
        message: String,
    },

    /// The operation is only available on Windows.
    #[error("unsupported on this platform")]
    Unsupported,
}

/// Result alias for this crate.
pub type Result<T> = StdResult<T, Error>;
