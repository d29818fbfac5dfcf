//! Low-level keyboard hook (`WH_KEYBOARD_LL`) integration.
//!
//! The hook procedure receives no user data pointer, so the active callback
//! context lives in a process-wide slot. The hook handle is kept in an atomic
//! for `CallNextHookEx`.
//!
//! Hook callbacks are delivered through the message loop of the installing
//! thread. That thread does nothing else: install, signal readiness, pump
//! messages until `WM_QUIT`, uninstall.

use std::{
    ffi::c_void,
    sync::atomic::{AtomicIsize, Ordering},
    thread::{self, JoinHandle},
};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, warn};
use windows::Win32::{
    Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM},
    System::{LibraryLoader::GetModuleHandleW, Threading::GetCurrentThreadId},
    UI::{
        Input::KeyboardAndMouse::{
            GetAsyncKeyState, VIRTUAL_KEY, VK_CONTROL, VK_LWIN, VK_MENU, VK_RWIN, VK_SHIFT,
        },
        WindowsAndMessaging::{
            CallNextHookEx, DispatchMessageW, GetForegroundWindow, GetMessageW, HHOOK,
            KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG, PM_NOREMOVE, PeekMessageW, PostThreadMessageW,
            SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, WH_KEYBOARD_LL, WM_KEYDOWN,
            WM_QUIT, WM_SYSKEYDOWN, WM_USER,
        },
    },
};

use crate::{
    CallbackCtx, Error, Result,
    policy::{self, KeyEventInfo},
};

/// Context of the installed hook, read from the hook procedure.
static ACTIVE: Mutex<Option<CallbackCtx>> = Mutex::new(None);
/// Raw `HHOOK` of the installed hook, or 0.
static HOOK: AtomicIsize = AtomicIsize::new(0);

/// Handle to a running hook thread.
pub(crate) struct Running {
    thread_id: u32,
    join: JoinHandle<()>,
}

/// Install the hook on a dedicated thread and wait until it is live.
pub(crate) fn start(ctx: CallbackCtx) -> Result<Running> {
    {
        let mut active = ACTIVE.lock();
        if active.is_some() {
            return Err(Error::AlreadyRunning);
        }
        *active = Some(ctx);
    }

    let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<u32>>(1);
    let join = thread::Builder::new()
        .name("win-hotkey".into())
        .spawn(move || run_hook_thread(&ready_tx))
        .map_err(|e| {
            ACTIVE.lock().take();
            Error::OsError(e.to_string())
        })?;

    match ready_rx.recv() {
        Ok(Ok(thread_id)) => Ok(Running { thread_id, join }),
        Ok(Err(e)) => {
            if join.join().is_err() {
                warn!("hook_thread_panicked");
            }
            ACTIVE.lock().take();
            Err(e)
        }
        Err(_) => {
            ACTIVE.lock().take();
            Err(Error::ThreadExited)
        }
    }
}

/// Quit the hook thread and wait for it.
pub(crate) fn stop(running: Running) {
    // SAFETY: posting to a thread id we created; failure only means the
    // thread already exited.
    if let Err(e) = unsafe { PostThreadMessageW(running.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
    {
        warn!(error = %e, "post_quit_failed");
    }
    if running.join.join().is_err() {
        warn!("hook_thread_panicked");
    }
    ACTIVE.lock().take();
}

/// Hook thread body: install, pump messages, uninstall.
fn run_hook_thread(ready: &Sender<Result<u32>>) {
    let mut msg = MSG::default();
    // SAFETY: plain Win32 calls on this thread with valid out-pointers.
    unsafe {
        // Force this thread's message queue into existence before anyone can
        // post WM_QUIT to it.
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
        let thread_id = GetCurrentThreadId();

        let hinst: HINSTANCE = match GetModuleHandleW(None) {
            Ok(m) => m.into(),
            Err(e) => {
                let _ = ready.send(Err(Error::HookInstall(e.to_string())));
                return;
            }
        };
        let hook = match SetWindowsHookExW(WH_KEYBOARD_LL, Some(hook_proc), hinst, 0) {
            Ok(h) => h,
            Err(e) => {
                warn!(error = %e, "keyboard_hook_install_failed");
                let _ = ready.send(Err(Error::HookInstall(e.to_string())));
                return;
            }
        };
        HOOK.store(hook.0 as isize, Ordering::SeqCst);
        let _ = ready.send(Ok(thread_id));
        debug!(thread_id, "keyboard_hook_installed");

        // GetMessageW returns -1 on error, 0 on WM_QUIT.
        while GetMessageW(&mut msg, None, 0, 0).0 > 0 {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        HOOK.store(0, Ordering::SeqCst);
        if let Err(e) = UnhookWindowsHookEx(hook) {
            warn!(error = %e, "keyboard_hook_uninstall_failed");
        }
    }
    debug!("keyboard_hook_removed");
}

fn key_down(vk: VIRTUAL_KEY) -> bool {
    // SAFETY: GetAsyncKeyState has no preconditions.
    unsafe { GetAsyncKeyState(i32::from(vk.0)) < 0 }
}

/// Modifier state as seen by the hook.
fn current_modifiers() -> win_keycode::Modifiers {
    policy::modifiers_from_state(
        key_down(VK_CONTROL),
        key_down(VK_MENU),
        key_down(VK_SHIFT),
        key_down(VK_LWIN) || key_down(VK_RWIN),
    )
}

unsafe extern "system" fn hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let hook = HHOOK(HOOK.load(Ordering::SeqCst) as *mut c_void);

    // Negative codes must be passed through untouched.
    if code >= 0 {
        let msg = wparam.0 as u32;
        let is_down = msg == WM_KEYDOWN || msg == WM_SYSKEYDOWN;
        // SAFETY: for WH_KEYBOARD_LL with code >= 0, lparam points at a
        // KBDLLHOOKSTRUCT owned by the OS for the duration of this call.
        let kbd = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        let injected = kbd.flags.0 & LLKHF_INJECTED.0 != 0;
        if is_down && !injected {
            let info = KeyEventInfo {
                vk: kbd.vkCode as u16,
                key_down: true,
                injected: false,
                modifiers: current_modifiers(),
            };
            // SAFETY: no preconditions.
            let fg = unsafe { GetForegroundWindow() };
            if let Some(ctx) = ACTIVE.lock().as_ref() {
                ctx.handle(info, fg.0 as isize);
            }
        }
    }

    // SAFETY: forwarding the exact arguments we were given.
    unsafe { CallNextHookEx(hook, code, wparam, lparam) }
}
