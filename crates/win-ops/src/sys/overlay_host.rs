//! Hint overlay window.
//!
//! The overlay is a borderless, topmost, layered popup covering the target
//! window. Magenta is the color key, so everything except the label boxes is
//! see-through. The window lives on a dedicated thread with its own message
//! loop; the engine talks to it through a command channel and a wake-up
//! thread message, and receives keyboard input through the sink passed to
//! [`OverlayHost::spawn`].

use std::{
    cell::RefCell,
    mem,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use windows::{
    Win32::{
        Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{
            BeginPaint, CreateSolidBrush, DEFAULT_GUI_FONT, DT_CALCRECT, DT_CENTER, DT_NOPREFIX,
            DT_SINGLELINE, DT_VCENTER, DeleteObject, DrawTextW, EndPaint, FillRect, FrameRect,
            GetStockObject, HDC, InvalidateRect, PAINTSTRUCT, SelectObject, SetBkMode,
            SetTextColor, TRANSPARENT,
        },
        System::{LibraryLoader::GetModuleHandleW, Threading::GetCurrentThreadId},
        UI::{
            Input::KeyboardAndMouse::{SetFocus, VIRTUAL_KEY, VK_BACK, VK_ESCAPE, VK_RETURN},
            WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect,
                GetMessageW, GetWindowThreadProcessId, HMENU, IDC_ARROW, LWA_COLORKEY,
                LoadCursorW, MSG, PM_NOREMOVE, PeekMessageW, PostThreadMessageW,
                RegisterClassExW, SW_SHOW, SetLayeredWindowAttributes, ShowWindow,
                TranslateMessage, WM_ACTIVATE, WM_APP, WM_CHAR, WM_KEYDOWN, WM_PAINT, WM_QUIT,
                WNDCLASSEXW, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
            },
        },
    },
    core::{Error as WinError, w},
};

use super::{
    os_err,
    window::{force_foreground, hwnd as to_hwnd, window_id},
};
use crate::{Error, OverlayInput, OverlayPlan, OverlaySurface, Result, WindowId, logical_to_px};

const KEY_COLOR: COLORREF = COLORREF(0x00FF_00FF);
const LABEL_FILL: COLORREF = COLORREF(0x0000_E0FF);
const LABEL_BORDER: COLORREF = COLORREF(0x0020_2020);
const LABEL_TEXT: COLORREF = COLORREF(0x0000_0000);
const ECHO_FILL: COLORREF = COLORREF(0x0030_3030);
const ECHO_TEXT: COLORREF = COLORREF(0x00FF_FFFF);
const LABEL_PAD: i32 = 3;
/// Thread message telling the overlay thread to drain its command queue.
const WM_HOST_COMMAND: u32 = WM_APP + 1;
const WA_INACTIVE: usize = 0;
/// Upper bound on waiting for the overlay thread to destroy a window.
const CLOSE_ACK_TIMEOUT: Duration = Duration::from_millis(250);

/// Requests from other threads to the overlay thread.
enum Command {
    Open { session: u64, plan: OverlayPlan },
    Text { session: u64, text: String },
    /// `done` is signalled once the window is gone, or was never shown.
    Close { session: u64, done: Sender<()> },
}

type InputSink = Box<dyn Fn(u64, OverlayInput) + Send>;

/// The overlay currently on screen.
struct Shown {
    session: u64,
    hwnd: HWND,
    plan: OverlayPlan,
    text: String,
}

/// Overlay thread state.
struct HostState {
    sink: InputSink,
    hinst: HINSTANCE,
    shown: Option<Shown>,
}

thread_local! {
    /// The overlay thread's state; only touched on that thread.
    static STATE: RefCell<Option<HostState>> = const { RefCell::new(None) };
}

/// Overlay host running on its own UI thread.
pub struct OverlayHost {
    tx: Sender<Command>,
    thread_id: u32,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl OverlayHost {
    /// Start the overlay thread. `sink` receives keyboard input from the
    /// overlay, tagged with the session that opened it.
    pub fn spawn<F>(sink: F) -> Result<Self>
    where
        F: Fn(u64, OverlayInput) + Send + 'static,
    {
        let (tx, rx) = unbounded();
        let (ready_tx, ready_rx) = bounded::<Result<u32>>(1);
        let join = thread::Builder::new()
            .name("hintkeys-overlay".into())
            .spawn(move || run(Box::new(sink), rx, ready_tx))
            .map_err(|e| Error::Os {
                op: "spawn",
                message: e.to_string(),
            })?;
        let thread_id = ready_rx.recv().map_err(|_| Error::OverlayUnavailable)??;
        debug!(thread_id, "overlay_host_started");
        Ok(Self {
            tx,
            thread_id,
            join: Mutex::new(Some(join)),
        })
    }

    /// Queue `cmd` and wake the overlay thread.
    fn send(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd).map_err(|_| Error::OverlayUnavailable)?;
        // SAFETY: posting to a thread id we own; fails only if it has exited.
        unsafe { PostThreadMessageW(self.thread_id, WM_HOST_COMMAND, WPARAM(0), LPARAM(0)) }
            .map_err(|_| Error::OverlayUnavailable)
    }

    /// Stop the overlay thread, closing any open overlay. Idempotent.
    pub fn shutdown(&self) {
        let Some(join) = self.join.lock().take() else {
            return;
        };
        // SAFETY: as in `send`.
        if unsafe { PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }.is_err() {
            debug!("overlay_thread_already_gone");
        }
        if join.join().is_err() {
            warn!("overlay_thread_panicked");
        }
    }
}

impl Drop for OverlayHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl OverlaySurface for OverlayHost {
    fn open(&self, session: u64, plan: &OverlayPlan) -> Result<()> {
        self.send(Command::Open {
            session,
            plan: plan.clone(),
        })
    }

    fn set_text(&self, session: u64, text: &str) -> Result<()> {
        self.send(Command::Text {
            session,
            text: text.to_owned(),
        })
    }

    /// Blocks until the overlay thread has destroyed the window, so input
    /// synthesized afterwards reaches the window underneath.
    fn close(&self, session: u64) -> Result<()> {
        let (done, acked) = bounded(1);
        self.send(Command::Close { session, done })?;
        if acked.recv_timeout(CLOSE_ACK_TIMEOUT).is_err() {
            warn!(session, "overlay_close_unacknowledged");
        }
        Ok(())
    }

    fn owns_window(&self, id: WindowId) -> bool {
        if id.is_null() {
            return false;
        }
        // SAFETY: read-only query; a stale handle yields thread id 0.
        let owner = unsafe { GetWindowThreadProcessId(to_hwnd(id), None) };
        owner == self.thread_id
    }
}

/// Overlay thread body.
fn run(sink: InputSink, rx: Receiver<Command>, ready: Sender<Result<u32>>) {
    let hinst = match register_class() {
        Ok(h) => h,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    STATE.with(|s| {
        *s.borrow_mut() = Some(HostState {
            sink,
            hinst,
            shown: None,
        })
    });

    let mut msg = MSG::default();
    // SAFETY: standard message loop on the thread that owns the windows.
    unsafe {
        // Create the message queue before anyone can post to it.
        let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
        let _ = ready.send(Ok(GetCurrentThreadId()));

        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            if msg.hwnd.0.is_null() && msg.message == WM_HOST_COMMAND {
                for cmd in rx.try_iter() {
                    handle(cmd);
                }
                continue;
            }
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    destroy_shown(|_| true);
    STATE.with(|s| *s.borrow_mut() = None);
    debug!("overlay_host_stopped");
}

fn register_class() -> Result<HINSTANCE> {
    // SAFETY: the class struct outlives the call; the name is a static literal.
    unsafe {
        let module = GetModuleHandleW(None).map_err(|e| os_err("GetModuleHandleW", &e))?;
        let hinst: HINSTANCE = module.into();
        let wc = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(wndproc),
            hInstance: hinst,
            hCursor: LoadCursorW(None, IDC_ARROW).map_err(|e| os_err("LoadCursorW", &e))?,
            hbrBackground: CreateSolidBrush(KEY_COLOR),
            lpszClassName: w!("HintkeysOverlay"),
            ..Default::default()
        };
        if RegisterClassExW(&wc) == 0 {
            return Err(os_err("RegisterClassExW", &WinError::from_win32()));
        }
        Ok(hinst)
    }
}

// Win32 calls below can re-enter `wndproc` synchronously, so state borrows
// are never held across them.
/// Apply one command on the overlay thread.
fn handle(cmd: Command) {
    match cmd {
        Command::Open { session, plan } => {
            destroy_shown(|_| true);
            match create_window(&plan) {
                Ok(hwnd) => {
                    STATE.with(|s| {
                        if let Some(state) = s.borrow_mut().as_mut() {
                            state.shown = Some(Shown {
                                session,
                                hwnd,
                                plan,
                                text: String::new(),
                            });
                        }
                    });
                    // SAFETY: hwnd was just created on this thread.
                    unsafe {
                        let _ = ShowWindow(hwnd, SW_SHOW);
                        force_foreground(window_id(hwnd));
                        let _ = SetFocus(hwnd);
                    }
                    debug!(session, "overlay_opened");
                }
                Err(e) => warn!(session, error = %e, "overlay_create_failed"),
            }
        }
        Command::Text { session, text } => {
            let hwnd = STATE.with(|s| {
                let mut s = s.borrow_mut();
                let shown = s.as_mut()?.shown.as_mut()?;
                (shown.session == session).then(|| {
                    shown.text = text;
                    shown.hwnd
                })
            });
            if let Some(hwnd) = hwnd {
                // SAFETY: hwnd belongs to this thread.
                let _ = unsafe { InvalidateRect(hwnd, None, true) };
            }
        }
        Command::Close { session, done } => {
            if destroy_shown(|shown| shown.session == session) {
                debug!(session, "overlay_closed");
            } else {
                trace!(session, "overlay_close_ignored");
            }
            if done.send(()).is_err() {
                trace!(session, "overlay_close_waiter_gone");
            }
        }
    }
}

/// Detach the shown overlay from state if `pred` accepts it, then destroy
/// its window. Detaching first means the focus change during destruction
/// finds no session to report to.
fn destroy_shown(pred: impl Fn(&Shown) -> bool) -> bool {
    let shown = STATE.with(|s| {
        let mut s = s.borrow_mut();
        let state = s.as_mut()?;
        if state.shown.as_ref().is_some_and(&pred) {
            state.shown.take()
        } else {
            None
        }
    });
    match shown {
        Some(shown) => {
            // SAFETY: hwnd belongs to this thread.
            if let Err(e) = unsafe { DestroyWindow(shown.hwnd) } {
                debug!(error = %e, "overlay_destroy_failed");
            }
            true
        }
        None => false,
    }
}

fn px(v: f64, dpi: u32) -> i32 {
    logical_to_px(v, dpi).round() as i32
}

/// Create the layered popup covering `plan.frame`.
fn create_window(plan: &OverlayPlan) -> Result<HWND> {
    let hinst = STATE
        .with(|s| s.borrow().as_ref().map(|st| st.hinst))
        .ok_or(Error::OverlayUnavailable)?;
    let f = plan.frame;
    // SAFETY: the class was registered on this thread.
    unsafe {
        let hwnd = CreateWindowExW(
            WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
            w!("HintkeysOverlay"),
            w!("hintkeys"),
            WS_POPUP,
            px(f.x, plan.dpi),
            px(f.y, plan.dpi),
            px(f.w, plan.dpi),
            px(f.h, plan.dpi),
            HWND::default(),
            HMENU::default(),
            hinst,
            None,
        )
        .map_err(|e| os_err("CreateWindowExW", &e))?;
        SetLayeredWindowAttributes(hwnd, KEY_COLOR, 255, LWA_COLORKEY)
            .map_err(|e| os_err("SetLayeredWindowAttributes", &e))?;
        Ok(hwnd)
    }
}

/// Forward input to the sink, tagged with the shown session.
fn emit(hwnd: HWND, input: OverlayInput) {
    STATE.with(|s| {
        let Ok(s) = s.try_borrow() else {
            return;
        };
        if let Some(state) = s.as_ref()
            && let Some(shown) = &state.shown
            && shown.hwnd == hwnd
        {
            trace!(session = shown.session, ?input, "overlay_input");
            (state.sink)(shown.session, input);
        }
    });
}

unsafe extern "system" fn wndproc(hwnd: HWND, msg: u32, wp: WPARAM, lp: LPARAM) -> LRESULT {
    match msg {
        WM_PAINT => {
            // SAFETY: called from the window's own message dispatch.
            unsafe { paint(hwnd) };
            LRESULT(0)
        }
        WM_CHAR => {
            if let Some(input) = char::from_u32(wp.0 as u32).and_then(OverlayInput::from_char) {
                emit(hwnd, input);
            }
            LRESULT(0)
        }
        WM_KEYDOWN => {
            let input = match VIRTUAL_KEY(wp.0 as u16) {
                VK_ESCAPE => Some(OverlayInput::Escape),
                VK_RETURN => Some(OverlayInput::Enter),
                VK_BACK => Some(OverlayInput::Backspace),
                _ => None,
            };
            match input {
                Some(input) => {
                    emit(hwnd, input);
                    LRESULT(0)
                }
                // SAFETY: default handling for our own window.
                None => unsafe { DefWindowProcW(hwnd, msg, wp, lp) },
            }
        }
        WM_ACTIVATE => {
            if wp.0 & 0xFFFF == WA_INACTIVE {
                emit(hwnd, OverlayInput::FocusLost);
            }
            // SAFETY: as above.
            unsafe { DefWindowProcW(hwnd, msg, wp, lp) }
        }
        // SAFETY: as above.
        _ => unsafe { DefWindowProcW(hwnd, msg, wp, lp) },
    }
}

unsafe fn fill(hdc: HDC, rc: &RECT, fill: COLORREF, border: Option<COLORREF>) {
    // SAFETY: brushes are created and released within this call.
    unsafe {
        let brush = CreateSolidBrush(fill);
        FillRect(hdc, rc, brush);
        let _ = DeleteObject(brush);
        if let Some(border) = border {
            let brush = CreateSolidBrush(border);
            FrameRect(hdc, rc, brush);
            let _ = DeleteObject(brush);
        }
    }
}

/// Draw `text` in a padded box with its top-left corner at (`x`, `y`).
unsafe fn text_box(
    hdc: HDC,
    x: i32,
    y: i32,
    text: &str,
    colors: (COLORREF, Option<COLORREF>, COLORREF),
) {
    let (bg, border, fg) = colors;
    let mut wide: Vec<u16> = text.encode_utf16().collect();
    let mut measure = RECT::default();
    // SAFETY: `wide` and the rects are valid for the duration of each call.
    unsafe {
        DrawTextW(
            hdc,
            &mut wide,
            &mut measure,
            DT_CALCRECT | DT_SINGLELINE | DT_NOPREFIX,
        );
        let mut rc = RECT {
            left: x,
            top: y,
            right: x + (measure.right - measure.left) + 2 * LABEL_PAD,
            bottom: y + (measure.bottom - measure.top) + 2 * LABEL_PAD,
        };
        fill(hdc, &rc, bg, border);
        SetTextColor(hdc, fg);
        DrawTextW(
            hdc,
            &mut wide,
            &mut rc,
            DT_CENTER | DT_VCENTER | DT_SINGLELINE | DT_NOPREFIX,
        );
    }
}

/// Draw every label and the echo box.
unsafe fn paint(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    // SAFETY: BeginPaint/EndPaint bracket all drawing on this thread.
    unsafe {
        let hdc = BeginPaint(hwnd, &mut ps);
        let mut rc = RECT::default();
        let _ = GetClientRect(hwnd, &mut rc);
        fill(hdc, &rc, KEY_COLOR, None);

        let old_font = SelectObject(hdc, GetStockObject(DEFAULT_GUI_FONT));
        SetBkMode(hdc, TRANSPARENT);

        STATE.with(|s| {
            let Ok(s) = s.try_borrow() else {
                return;
            };
            let Some(shown) = s.as_ref().and_then(|st| st.shown.as_ref()) else {
                return;
            };
            if shown.hwnd != hwnd {
                return;
            }
            let typed = shown.text.to_ascii_uppercase();
            let dpi = shown.plan.dpi;
            for mark in &shown.plan.marks {
                if !mark.label.starts_with(&typed) {
                    continue;
                }
                text_box(
                    hdc,
                    px(mark.bounds.x, dpi),
                    px(mark.bounds.y, dpi),
                    &mark.label,
                    (LABEL_FILL, Some(LABEL_BORDER), LABEL_TEXT),
                );
            }
            if !shown.text.is_empty() {
                text_box(hdc, 8, 8, &typed, (ECHO_FILL, None, ECHO_TEXT));
            }
        });

        SelectObject(hdc, old_font);
        let _ = EndPaint(hwnd, &ps);
    }
}
