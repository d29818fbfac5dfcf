//! Fallback for platforms without low-level keyboard hooks.

use crate::{CallbackCtx, Error, Result};

/// Placeholder handle on platforms without a hook.
#[allow(dead_code)]
pub(crate) struct Running;

pub(crate) fn start(_ctx: CallbackCtx) -> Result<Running> {
    Err(Error::Unsupported)
}

pub(crate) fn stop(_running: Running) {}
