//! Geometry primitives.
//!
//! Device-pixel coordinates come straight from the OS (`GetWindowRect`, UI
//! Automation bounding rectangles). Logical units are device pixels scaled to
//! a 96 DPI baseline, which is what the overlay layout is expressed in.

/// DPI at which one logical unit equals one device pixel.
pub const BASE_DPI: u32 = 96;

/// Convert a device-pixel length to logical units for a window at `dpi`.
/// A zero DPI is treated as the baseline.
#[inline]
pub fn px_to_logical(px: f64, dpi: u32) -> f64 {
    let dpi = if dpi == 0 { BASE_DPI } else { dpi };
    px * f64::from(BASE_DPI) / f64::from(dpi)
}

/// Convert logical units back to device pixels for a window at `dpi`.
#[inline]
pub fn logical_to_px(logical: f64, dpi: u32) -> f64 {
    let dpi = if dpi == 0 { BASE_DPI } else { dpi };
    logical * f64::from(dpi) / f64::from(BASE_DPI)
}

/// A point.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate, growing rightwards.
    pub x: f64,
    /// Vertical coordinate, growing downwards.
    pub y: f64,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle with the origin at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[allow(missing_docs)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Construct a rectangle from origin and size.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Construct from left/top/right/bottom edges, as Win32 `RECT` reports.
    pub fn from_ltrb(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            w: right - left,
            h: bottom - top,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Centre point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// True if the rectangle cannot be hinted: any component is NaN or
    /// infinite, or it has no area.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x, self.y, self.w, self.h]
            .iter()
            .all(|v| v.is_finite());
        !finite || self.w <= 0.0 || self.h <= 0.0
    }

    /// Offset so that `origin` becomes (0, 0).
    pub fn relative_to(&self, origin: Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            w: self.w,
            h: self.h,
        }
    }

    /// Scale from device pixels to logical units at `dpi`.
    pub fn to_logical(&self, dpi: u32) -> Self {
        Self {
            x: px_to_logical(self.x, dpi),
            y: px_to_logical(self.y, dpi),
            w: px_to_logical(self.w, dpi),
            h: px_to_logical(self.h, dpi),
        }
    }

    /// Top-left corner.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
