//! Win32 and UI Automation implementations.

pub(crate) mod input;
pub(crate) mod overlay_host;
pub(crate) mod uia;
pub(crate) mod window;

use windows::core::Error as WinError;

use crate::Error;

/// Wrap an OS error with the name of the failing call.
pub(crate) fn os_err(op: &'static str, e: &WinError) -> Error {
    Error::Os {
        op,
        message: e.message(),
    }
}
