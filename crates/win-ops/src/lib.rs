//! win-ops: Windows operations for hintkeys.
//!
//! - [`WinOps`]: foreground window queries, window geometry and DPI, focus
//!   activation across UI threads, synthesized mouse clicks, and the UI
//!   Automation root of a window.
//! - [`UiElement`]: a node of the accessibility tree. The Windows
//!   implementation wraps `IUIAutomationElement` and walks the control view.
//! - [`OverlaySurface`]: the hint overlay host. On Windows, [`OverlayHost`]
//!   runs a topmost layered window on its own thread.
//!
//! With the `test-utils` feature, [`mock`] provides in-memory implementations
//! of all three for engine tests.
//!
//! UI Automation calls require COM on the calling thread; see [`com`].

pub mod com;
mod element;
mod error;
mod geom;
mod ops;
mod overlay;
mod window;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(windows)]
mod sys;

pub use element::{ControlType, Describe, Element, UiElement};
pub use error::{Error, Result};
pub use geom::{BASE_DPI, Point, Rect, logical_to_px, px_to_logical};
pub use ops::{RealWinOps, WinOps};
pub use overlay::{HintMark, OverlayInput, OverlayPlan, OverlaySurface};
#[cfg(windows)]
pub use sys::overlay_host::OverlayHost;
pub use window::{CapturedWindow, WindowId};

/// Opt the process into per-monitor DPI awareness so window and element
/// rectangles are reported in true device pixels. Call once at startup,
/// before creating any window. A no-op off Windows.
pub fn init_dpi_awareness() {
    #[cfg(windows)]
    sys::window::init_dpi_awareness();
}
