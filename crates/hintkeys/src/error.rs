//! Top-level error type for the binary.
use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Result alias for the binary.
pub type Result<T> = StdResult<T, Error>;

/// Anything that can stop the app.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be loaded.
    #[error("{}", .0.pretty())]
    Config(#[from] config::Error),

    /// The global keyboard hook failed.
    #[error("hotkey listener: {0}")]
    Hotkey(#[from] win_hotkey::Error),

    /// A window or overlay operation failed during startup.
    #[error("{0}")]
    Ops(#[from] win_ops::Error),

    /// Runtime construction or output failed.
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// Serializing the binding dump failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The hint overlay only runs on Windows.
    #[error("hintkeys only runs on Windows; `check` works everywhere")]
    Unsupported,
}
