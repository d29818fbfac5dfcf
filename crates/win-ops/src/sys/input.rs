use std::mem;

use tracing::trace;
use windows::{
    Win32::UI::{
        Input::KeyboardAndMouse::{
            INPUT, INPUT_0, INPUT_MOUSE, MOUSE_EVENT_FLAGS, MOUSEEVENTF_ABSOLUTE,
            MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MOVE, MOUSEEVENTF_VIRTUALDESK,
            MOUSEINPUT, SendInput,
        },
        WindowsAndMessaging::{
            GetSystemMetrics, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
            SM_YVIRTUALSCREEN,
        },
    },
    core::Error as WinError,
};

use super::os_err;
use crate::{Error, Point, Result};

/// Normalize a screen coordinate to the 0..=65535 absolute range across the
/// whole virtual desktop.
fn normalize(v: f64, origin: i32, extent: i32) -> i32 {
    ((v - f64::from(origin)) * 65535.0 / f64::from(extent)).round() as i32
}

/// One absolute-or-relative mouse `INPUT` record.
fn mouse(dx: i32, dy: i32, flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx,
                dy,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Move to `at` and click the left button.
pub(crate) fn send_click(at: Point) -> Result<()> {
    // SAFETY: metric queries have no preconditions.
    let (sx, sy, sw, sh) = unsafe {
        (
            GetSystemMetrics(SM_XVIRTUALSCREEN),
            GetSystemMetrics(SM_YVIRTUALSCREEN),
            GetSystemMetrics(SM_CXVIRTUALSCREEN),
            GetSystemMetrics(SM_CYVIRTUALSCREEN),
        )
    };
    if sw <= 0 || sh <= 0 {
        return Err(Error::Os {
            op: "GetSystemMetrics",
            message: "virtual screen has no extent".into(),
        });
    }
    let dx = normalize(at.x, sx, sw);
    let dy = normalize(at.y, sy, sh);
    let base = MOUSEEVENTF_ABSOLUTE | MOUSEEVENTF_VIRTUALDESK | MOUSEEVENTF_MOVE;
    let inputs = [
        mouse(dx, dy, base | MOUSEEVENTF_LEFTDOWN),
        mouse(dx, dy, base | MOUSEEVENTF_LEFTUP),
    ];
    // SAFETY: the slice and size describe valid INPUT records.
    let sent = unsafe { SendInput(&inputs, mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        return Err(os_err("SendInput", &WinError::from_win32()));
    }
    trace!(x = at.x, y = at.y, "click_sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_spans_virtual_desktop() {
        assert_eq!(normalize(0.0, 0, 1920), 0);
        assert_eq!(normalize(1920.0, 0, 1920), 65535);
        assert_eq!(normalize(-1920.0, -1920, 3840), 0);
        assert_eq!(normalize(0.0, -1920, 3840), 32768);
    }
}
