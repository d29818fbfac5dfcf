use std::fmt;

use crate::{Point, Rect};

/// Opaque top-level window handle (`HWND` value).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub isize);

impl WindowId {
    /// True for the null handle.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// A window snapshot taken when a hint session starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapturedWindow {
    /// Window handle.
    pub id: WindowId,
    /// Outer window rectangle in screen device pixels.
    pub rect: Rect,
    /// The window's own DPI (96 = 100% scaling).
    pub dpi: u32,
}

impl CapturedWindow {
    /// Window origin in device pixels.
    pub fn origin(&self) -> Point {
        self.rect.origin()
    }

    /// Window rectangle in logical units.
    pub fn logical_rect(&self) -> Rect {
        self.rect.to_logical(self.dpi)
    }
}
