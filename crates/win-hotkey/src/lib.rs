//! win-hotkey: Windows global hotkey listener.
//!
//! A [`Manager`] owns a dedicated thread that installs a low-level keyboard
//! hook (`WH_KEYBOARD_LL`) and pumps that thread's message queue, as the OS
//! requires for hook callbacks to be delivered. Every key-down is matched
//! against the registered [`Chord`] set; a match is reported as an [`Event`]
//! on a crossbeam channel.
//!
//! The listener never swallows input: every event is forwarded to the next
//! hook in the chain whether or not it matched. Callbacks stay short since
//! the OS silently removes hooks that take too long.
//!
//! Only one manager may be running per process.

use std::collections::HashSet;
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, trace};
pub use win_keycode::Chord;

mod error;
pub mod policy;

#[cfg(windows)]
mod sys;
#[cfg(not(windows))]
#[path = "unsupported.rs"]
mod sys;

pub use error::{Error, Result};
use policy::KeyEventInfo;

/// A registered chord was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// The chord that matched.
    pub chord: Chord,
    /// Raw handle of the foreground window at the moment of the key press.
    pub foreground: isize,
}

/// State shared between the manager and the hook callback.
#[derive(Default)]
pub(crate) struct Inner {
    bindings: HashSet<Chord>,
}

/// What the hook needs to match and report chords.
#[derive(Clone)]
pub(crate) struct CallbackCtx {
    pub(crate) inner: Arc<Mutex<Inner>>,
    pub(crate) tx: Sender<Event>,
}

impl CallbackCtx {
    /// Match one key event and notify the listener on success. Returns the
    /// matched chord.
    pub(crate) fn handle(&self, info: KeyEventInfo, foreground: isize) -> Option<Chord> {
        let matched = {
            let inner = self.inner.lock();
            policy::classify(&inner.bindings, info)
        }?;
        trace!(chord = %matched, foreground, "hotkey_matched");
        if self
            .tx
            .send(Event {
                chord: matched,
                foreground,
            })
            .is_err()
        {
            debug!("hotkey_listener_gone");
        }
        Some(matched)
    }
}

/// Global hotkey listener.
pub struct Manager {
    ctx: CallbackCtx,
    running: Mutex<Option<sys::Running>>,
}

impl Manager {
    /// Create a manager that reports matches on `tx`. The hook is not
    /// installed until [`Manager::start`] is called.
    pub fn new(tx: Sender<Event>) -> Self {
        Self {
            ctx: CallbackCtx {
                inner: Arc::new(Mutex::new(Inner::default())),
                tx,
            },
            running: Mutex::new(None),
        }
    }

    /// Replace the registered chord set. Takes effect for the next key event,
    /// whether or not the hook is running.
    pub fn set_bindings<I>(&self, chords: I)
    where
        I: IntoIterator<Item = Chord>,
    {
        let bindings: HashSet<Chord> = chords.into_iter().collect();
        debug!(count = bindings.len(), "hotkey_bindings_updated");
        self.ctx.inner.lock().bindings = bindings;
    }

    /// The registered chords, sorted.
    pub fn bindings(&self) -> Vec<Chord> {
        let mut out: Vec<Chord> = self.ctx.inner.lock().bindings.iter().copied().collect();
        out.sort();
        out
    }

    /// Install the keyboard hook on a dedicated thread. Returns once the hook
    /// is live, or with the installation error.
    pub fn start(&self) -> Result<()> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Err(Error::AlreadyRunning);
        }
        *running = Some(sys::start(self.ctx.clone())?);
        debug!("hotkey_manager_started");
        Ok(())
    }

    /// Remove the hook and join its thread. A no-op if not running.
    pub fn stop(&self) {
        if let Some(r) = self.running.lock().take() {
            sys::stop(r);
            debug!("hotkey_manager_stopped");
        }
    }

    /// Whether the hook is currently installed.
    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.stop();
    }
}
