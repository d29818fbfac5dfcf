//! COM apartment setup.
//!
//! UI Automation clients must run in a COM apartment. The engine thread joins
//! the multithreaded apartment so element handles may be used from any
//! thread.

use crate::Result;

/// Keeps COM initialized on the current thread until dropped.
#[derive(Debug)]
pub struct ComGuard {
    #[cfg(windows)]
    initialized: bool,
}

/// Join the multithreaded apartment on the current thread.
#[cfg(windows)]
pub fn init_mta() -> Result<ComGuard> {
    use tracing::debug;
    use windows::Win32::System::Com::{COINIT_MULTITHREADED, CoInitializeEx};

    use crate::Error;

    // SAFETY: paired with CoUninitialize in Drop on the same thread.
    let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
    if hr.is_err() {
        return Err(Error::Os {
            op: "CoInitializeEx",
            message: hr.message(),
        });
    }
    debug!("com_mta_initialized");
    Ok(ComGuard { initialized: true })
}

/// Join the multithreaded apartment on the current thread. A no-op off
/// Windows.
#[cfg(not(windows))]
pub fn init_mta() -> Result<ComGuard> {
    Ok(ComGuard {})
}

#[cfg(windows)]
use windows::Win32::System::Com::CoUninitialize;

#[cfg(windows)]
impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            // SAFETY: balances the successful CoInitializeEx above.
            unsafe { CoUninitialize() };
        }
    }
}
