//! Virtual key codes and conversions.
//!
//! A "virtual key" here is the integer reported in `KBDLLHOOKSTRUCT::vkCode`
//! by the low-level keyboard hook: a layout-dependent identifier for a key,
//! not a character and not a hardware scan code.

use crate::Key;

/// Windows virtual-key code (`VK_*`).
pub type VirtualKey = u16;

// Generic modifier codes. The low-level hook reports the sided variants, but
// synthesized input may carry these.
const VK_SHIFT: VirtualKey = 0x10;
const VK_CONTROL: VirtualKey = 0x11;
const VK_MENU: VirtualKey = 0x12;

impl TryFrom<VirtualKey> for Key {
    type Error = ();
    fn try_from(value: VirtualKey) -> Result<Self, Self::Error> {
        Self::from_vk(value).ok_or(())
    }
}

impl From<Key> for VirtualKey {
    fn from(k: Key) -> Self {
        k as u16
    }
}

impl Key {
    /// Looks up a `Key` from a virtual-key code, folding the generic
    /// Shift/Ctrl/Alt codes onto their left-hand variants.
    pub fn from_vk(vk: VirtualKey) -> Option<Self> {
        match vk {
            VK_SHIFT => Some(Self::LeftShift),
            VK_CONTROL => Some(Self::LeftCtrl),
            VK_MENU => Some(Self::LeftAlt),
            _ => Self::from_keycode(vk),
        }
    }

    /// Returns the virtual-key code for this key.
    pub const fn vk(self) -> VirtualKey {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_samples() {
        let samples = [
            Key::A,
            Key::Digit1,
            Key::Space,
            Key::Enter,
            Key::Left,
            Key::F1,
            Key::F24,
            Key::NumPad5,
        ];
        for k in samples {
            let vk = k.vk();
            assert_eq!(Key::from_vk(vk), Some(k));
            assert_eq!(Key::try_from(vk).ok(), Some(k));
            assert_eq!(VirtualKey::from(k), vk);
        }
        assert_eq!(Key::from_vk(0xFFFF), None);
    }

    #[test]
    fn generic_modifier_codes_fold_left() {
        assert_eq!(Key::from_vk(0x10), Some(Key::LeftShift));
        assert_eq!(Key::from_vk(0x11), Some(Key::LeftCtrl));
        assert_eq!(Key::from_vk(0x12), Some(Key::LeftAlt));
    }
}
