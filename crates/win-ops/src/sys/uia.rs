//! UI Automation adapter.
//!
//! Elements are walked through the control view, which hides purely
//! structural nodes the way assistive tools see the tree.

use std::sync::Arc;

use windows::{
    Win32::{
        System::Com::{CLSCTX_INPROC_SERVER, CoCreateInstance},
        UI::Accessibility::{
            CUIAutomation8, IUIAutomation, IUIAutomationElement, IUIAutomationInvokePattern,
            IUIAutomationTreeWalker, UIA_InvokePatternId,
        },
    },
    core::{Error as WinError, Result as WinResult},
};

use super::{os_err, window::hwnd};
use crate::{ControlType, Element, Error, Rect, Result, UiElement, WindowId};

// UIA_E_ELEMENTNOTAVAILABLE
const ELEMENT_NOT_AVAILABLE: i32 = 0x8004_0201_u32 as i32;

/// Map a COM error, treating a vanished element as stale.
fn map_err(op: &'static str, e: &WinError) -> Error {
    if e.code().0 == ELEMENT_NOT_AVAILABLE {
        Error::StaleElement
    } else {
        os_err(op, e)
    }
}

/// Navigation results: a null out-pointer surfaces as an error carrying a
/// success code, meaning "no such element".
fn nav(
    r: WinResult<IUIAutomationElement>,
    walker: &IUIAutomationTreeWalker,
    op: &'static str,
) -> Result<Option<Element>> {
    match r {
        Ok(elem) => Ok(Some(Arc::new(UiaElement {
            elem,
            walker: walker.clone(),
        }))),
        Err(e) if e.code().is_ok() => Ok(None),
        Err(e) => Err(map_err(op, &e)),
    }
}

/// A UI Automation element.
struct UiaElement {
    elem: IUIAutomationElement,
    walker: IUIAutomationTreeWalker,
}

// SAFETY: elements are created on an MTA thread; UI Automation client proxies
// are free-threaded and may be called from any thread in the apartment.
unsafe impl Send for UiaElement {}
// SAFETY: see above.
unsafe impl Sync for UiaElement {}

impl UiElement for UiaElement {
    fn control_type(&self) -> Result<ControlType> {
        // SAFETY: COM call on a live interface pointer.
        let ct = unsafe { self.elem.CurrentControlType() }
            .map_err(|e| map_err("CurrentControlType", &e))?;
        Ok(ControlType::from_id(ct.0))
    }

    fn name(&self) -> Result<String> {
        // SAFETY: as above.
        let name = unsafe { self.elem.CurrentName() }.map_err(|e| map_err("CurrentName", &e))?;
        Ok(name.to_string())
    }

    fn is_offscreen(&self) -> Result<bool> {
        // SAFETY: as above.
        let off = unsafe { self.elem.CurrentIsOffscreen() }
            .map_err(|e| map_err("CurrentIsOffscreen", &e))?;
        Ok(off.as_bool())
    }

    fn bounds(&self) -> Result<Rect> {
        // SAFETY: as above.
        let r = unsafe { self.elem.CurrentBoundingRectangle() }
            .map_err(|e| map_err("CurrentBoundingRectangle", &e))?;
        Ok(Rect::from_ltrb(
            f64::from(r.left),
            f64::from(r.top),
            f64::from(r.right),
            f64::from(r.bottom),
        ))
    }

    fn first_child(&self) -> Result<Option<Element>> {
        // SAFETY: as above.
        let r = unsafe { self.walker.GetFirstChildElement(&self.elem) };
        nav(r, &self.walker, "GetFirstChildElement")
    }

    fn next_sibling(&self) -> Result<Option<Element>> {
        // SAFETY: as above.
        let r = unsafe { self.walker.GetNextSiblingElement(&self.elem) };
        nav(r, &self.walker, "GetNextSiblingElement")
    }

    fn can_invoke(&self) -> bool {
        // SAFETY: as above.
        unsafe {
            self.elem
                .GetCurrentPatternAs::<IUIAutomationInvokePattern>(UIA_InvokePatternId)
        }
        .is_ok()
    }

    fn invoke(&self) -> Result<()> {
        // SAFETY: as above.
        unsafe {
            let pattern = self
                .elem
                .GetCurrentPatternAs::<IUIAutomationInvokePattern>(UIA_InvokePatternId)
                .map_err(|_| Error::NotSupported("invoke"))?;
            pattern.Invoke().map_err(|e| map_err("Invoke", &e))
        }
    }
}

/// The accessibility root of a top-level window. Requires COM on the calling
/// thread.
pub(crate) fn root_element(id: WindowId) -> Result<Element> {
    // SAFETY: COM is initialized by the caller; all pointers are owned
    // interface wrappers.
    unsafe {
        let uia: IUIAutomation = CoCreateInstance(&CUIAutomation8, None, CLSCTX_INPROC_SERVER)
            .map_err(|e| os_err("CoCreateInstance", &e))?;
        let elem = uia
            .ElementFromHandle(hwnd(id))
            .map_err(|e| map_err("ElementFromHandle", &e))?;
        let walker = uia
            .ControlViewWalker()
            .map_err(|e| os_err("ControlViewWalker", &e))?;
        Ok(Arc::new(UiaElement { elem, walker }))
    }
}
