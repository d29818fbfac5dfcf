//! Overlay surface contract.
//!
//! The engine describes what to show with an [`OverlayPlan`] and drives a
//! surface through [`OverlaySurface`]. Keyboard input typed into the overlay
//! comes back as [`OverlayInput`] values tagged with the session that opened
//! the overlay, so input from a closing overlay can never reach a newer one.

use crate::{Rect, Result, WindowId};

/// One label to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct HintMark {
    /// Label text, e.g. `"AB"`.
    pub label: String,
    /// Element bounds relative to the overlay origin, in logical units.
    pub bounds: Rect,
}

/// Everything a surface needs to open an overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPlan {
    /// Overlay frame in logical units; covers the captured window exactly.
    pub frame: Rect,
    /// DPI of the captured window, to map logical units back to pixels.
    pub dpi: u32,
    /// Labels in discovery order.
    pub marks: Vec<HintMark>,
}

/// Input events delivered by an open overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayInput {
    /// An alphabetic character was typed.
    Char(char),
    /// Remove the last typed character.
    Backspace,
    /// Accept the current selection.
    Enter,
    /// Dismiss the overlay.
    Escape,
    /// The overlay lost keyboard focus.
    FocusLost,
}

impl OverlayInput {
    /// Filter typed characters at the input boundary: only ASCII letters
    /// become input.
    pub fn from_char(c: char) -> Option<Self> {
        c.is_ascii_alphabetic().then_some(Self::Char(c))
    }
}

/// A host that can display hint overlays. Calls carry the owning session id;
/// a surface shows at most one overlay at a time.
pub trait OverlaySurface: Send + Sync {
    /// Show a new overlay, replacing any existing one, and take keyboard
    /// focus.
    fn open(&self, session: u64, plan: &OverlayPlan) -> Result<()>;

    /// Update the echoed text for the session's overlay.
    fn set_text(&self, session: u64, text: &str) -> Result<()>;

    /// Close the session's overlay. Closing an overlay that is not open is
    /// not an error. Returns once the overlay no longer covers the target.
    fn close(&self, session: u64) -> Result<()>;

    /// Whether `window` is an overlay window owned by this surface. The
    /// engine uses this to see past its own overlay when it is in front.
    fn owns_window(&self, window: WindowId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_letters_pass_the_boundary() {
        assert_eq!(OverlayInput::from_char('a'), Some(OverlayInput::Char('a')));
        assert_eq!(OverlayInput::from_char('Z'), Some(OverlayInput::Char('Z')));
        assert_eq!(OverlayInput::from_char('1'), None);
        assert_eq!(OverlayInput::from_char(' '), None);
        assert_eq!(OverlayInput::from_char('\r'), None);
        assert_eq!(OverlayInput::from_char('é'), None);
    }
}
