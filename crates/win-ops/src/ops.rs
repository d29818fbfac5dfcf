use crate::{CapturedWindow, Element, Point, Result, WindowId};

/// Trait abstraction over window operations to improve testability.
pub trait WinOps: Send + Sync {
    /// The current foreground window, if any.
    fn foreground_window(&self) -> Option<WindowId>;

    /// Snapshot the geometry and DPI of `id`.
    fn capture_window(&self, id: WindowId) -> Result<CapturedWindow>;

    /// Accessibility root element for a captured window.
    fn root_element(&self, window: &CapturedWindow) -> Result<Element>;

    /// Synthesize a left click at a screen point in device pixels.
    fn send_click(&self, at: Point) -> Result<()>;

    /// Bring `id` to the foreground, even when it belongs to another UI
    /// thread. Best effort: failures are logged, not returned.
    fn activate_window(&self, id: WindowId);
}

/// Production implementation of WinOps delegating to the platform layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealWinOps;

#[cfg(windows)]
impl WinOps for RealWinOps {
    fn foreground_window(&self) -> Option<WindowId> {
        crate::sys::window::foreground_window()
    }
    fn capture_window(&self, id: WindowId) -> Result<CapturedWindow> {
        crate::sys::window::capture_window(id)
    }
    fn root_element(&self, window: &CapturedWindow) -> Result<Element> {
        crate::sys::uia::root_element(window.id)
    }
    fn send_click(&self, at: Point) -> Result<()> {
        crate::sys::input::send_click(at)
    }
    fn activate_window(&self, id: WindowId) {
        crate::sys::window::force_foreground(id)
    }
}

#[cfg(not(windows))]
impl WinOps for RealWinOps {
    fn foreground_window(&self) -> Option<WindowId> {
        None
    }
    fn capture_window(&self, _id: WindowId) -> Result<CapturedWindow> {
        Err(crate::Error::Unsupported)
    }
    fn root_element(&self, _window: &CapturedWindow) -> Result<Element> {
        Err(crate::Error::Unsupported)
    }
    fn send_click(&self, _at: Point) -> Result<()> {
        Err(crate::Error::Unsupported)
    }
    fn activate_window(&self, _id: WindowId) {}
}
