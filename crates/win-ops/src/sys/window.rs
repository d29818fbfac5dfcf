use std::ffi::c_void;

use tracing::{debug, warn};
use windows::Win32::{
    Foundation::{HWND, RECT},
    System::Threading::{AttachThreadInput, GetCurrentThreadId},
    UI::{
        HiDpi::{
            DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, GetDpiForWindow,
            SetProcessDpiAwarenessContext,
        },
        WindowsAndMessaging::{
            BringWindowToTop, GetForegroundWindow, GetWindowRect, GetWindowThreadProcessId,
            IsWindow, SetForegroundWindow,
        },
    },
};

use crate::{CapturedWindow, Error, Rect, Result, WindowId};

pub(crate) fn hwnd(id: WindowId) -> HWND {
    HWND(id.0 as *mut c_void)
}

pub(crate) fn window_id(h: HWND) -> WindowId {
    WindowId(h.0 as isize)
}

/// Opt the process into per-monitor DPI awareness.
pub(crate) fn init_dpi_awareness() {
    // SAFETY: process-wide setting with no pointer arguments.
    if let Err(e) =
        unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) }
    {
        // Already set by a manifest or an earlier call.
        debug!(error = %e, "dpi_awareness_unchanged");
    }
}

pub(crate) fn foreground_window() -> Option<WindowId> {
    // SAFETY: no preconditions.
    let h = unsafe { GetForegroundWindow() };
    let id = window_id(h);
    (!id.is_null()).then_some(id)
}

/// Read rect and DPI of a live top-level window.
pub(crate) fn capture_window(id: WindowId) -> Result<CapturedWindow> {
    let h = hwnd(id);
    // SAFETY: IsWindow accepts any handle value.
    if id.is_null() || !unsafe { IsWindow(h) }.as_bool() {
        return Err(Error::WindowGone);
    }
    let mut rc = RECT::default();
    // SAFETY: valid out-pointer.
    unsafe { GetWindowRect(h, &mut rc) }.map_err(|e| super::os_err("GetWindowRect", &e))?;
    // SAFETY: returns 0 for an invalid handle.
    let dpi = unsafe { GetDpiForWindow(h) };
    if dpi == 0 {
        return Err(Error::WindowGone);
    }
    Ok(CapturedWindow {
        id,
        rect: Rect::from_ltrb(
            f64::from(rc.left),
            f64::from(rc.top),
            f64::from(rc.right),
            f64::from(rc.bottom),
        ),
        dpi,
    })
}

/// Move `id` to the foreground.
///
/// Windows only lets the thread that owns the foreground window hand
/// foreground status away, so this attaches our input queue to the
/// foreground thread for the duration of the call.
pub(crate) fn force_foreground(id: WindowId) {
    let target = hwnd(id);
    // SAFETY: plain Win32 calls; every attach is paired with a detach.
    unsafe {
        let fg = GetForegroundWindow();
        let fg_thread = GetWindowThreadProcessId(fg, None);
        let me = GetCurrentThreadId();
        let attached =
            fg_thread != 0 && fg_thread != me && AttachThreadInput(me, fg_thread, true).as_bool();

        if !SetForegroundWindow(target).as_bool() {
            warn!(window = %id, "set_foreground_failed");
        }
        if let Err(e) = BringWindowToTop(target) {
            debug!(window = %id, error = %e, "bring_to_top_failed");
        }

        if attached {
            let _ = AttachThreadInput(me, fg_thread, false);
        }
    }
}
