use bitflags::bitflags;

use crate::Key;

bitflags! {
    /// Set of modifier keys held with a chord. Left and right variants of a
    /// modifier are not distinguished.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
    pub struct Modifiers: u8 {
        /// Either Ctrl key.
        const CTRL = 1;
        /// Either Alt key.
        const ALT = 1 << 1;
        /// Either Shift key.
        const SHIFT = 1 << 2;
        /// Either Windows (meta) key.
        const WIN = 1 << 3;
    }
}

impl Modifiers {
    /// Canonical emission order.
    pub const ORDER: [Self; 4] = [Self::CTRL, Self::ALT, Self::SHIFT, Self::WIN];

    /// Parses a modifier spelling, ignoring ASCII case.
    ///
    /// Accepts `ctrl`/`control`, `alt`, `shift` and `win`/`windows`.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::CTRL),
            "alt" => Some(Self::ALT),
            "shift" => Some(Self::SHIFT),
            "win" | "windows" => Some(Self::WIN),
            _ => None,
        }
    }

    /// Canonical name of a single modifier flag. Returns `None` for the empty
    /// set or for a combination of flags.
    pub fn name(self) -> Option<&'static str> {
        if self == Self::CTRL {
            Some("Ctrl")
        } else if self == Self::ALT {
            Some("Alt")
        } else if self == Self::SHIFT {
            Some("Shift")
        } else if self == Self::WIN {
            Some("Win")
        } else {
            None
        }
    }

    /// Names of the flags in this set, in canonical order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::ORDER
            .into_iter()
            .filter(move |m| self.contains(*m))
            .filter_map(Self::name)
    }

    /// The modifier flag a physical modifier key contributes, if any.
    pub const fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::LeftCtrl | Key::RightCtrl => Some(Self::CTRL),
            Key::LeftAlt | Key::RightAlt => Some(Self::ALT),
            Key::LeftShift | Key::RightShift => Some(Self::SHIFT),
            Key::LeftWin | Key::RightWin => Some(Self::WIN),
            _ => None,
        }
    }
}
