use crate::Key;

// Symbol shorthands, matched exactly. `+` is the chord separator, so the plus
// key is only reachable by name.
macro_rules! key_spec_map {
    ($m:ident, $arg:tt) => {
        $m! { $arg,
            Digit0 => "0",
            Digit1 => "1",
            Digit2 => "2",
            Digit3 => "3",
            Digit4 => "4",
            Digit5 => "5",
            Digit6 => "6",
            Digit7 => "7",
            Digit8 => "8",
            Digit9 => "9",
            Minus => "-",
            Plus => "=",
            LeftBracket => "[",
            RightBracket => "]",
            Backslash => "\\",
            Semicolon => ";",
            Quote => "'",
            Comma => ",",
            Period => ".",
            Slash => "/",
            Grave => "`",
        }
    };
}

macro_rules! from_spec_match {
    ( $s:expr, $( $k:ident => $v:expr, )* ) => {{
        match $s {
            $( $v => Some(Key::$k), )*
            _ => None,
        }
    }}
}

// Aliases that only apply to parsing (never emitted). Matched lowercased.
macro_rules! key_spec_aliases {
    ($m:ident, $arg:expr) => {
        $m! { $arg,
            Enter => "return",
            Enter => "ret",
            Escape => "esc",
            Backspace => "back",
            Delete => "del",
            Insert => "ins",
            PageUp => "pgup",
            PageUp => "prior",
            PageDown => "pgdn",
            PageDown => "next",
            Left => "leftarrow",
            Right => "rightarrow",
            Up => "uparrow",
            Down => "downarrow",
            Apps => "menu",
            CapsLock => "capital",
            CapsLock => "caps",
            PrintScreen => "snapshot",
            PrintScreen => "prtsc",
            ScrollLock => "scroll",
            LeftWin => "lwin",
            RightWin => "rwin",
            LeftShift => "lshift",
            RightShift => "rshift",
            LeftCtrl => "lctrl",
            RightCtrl => "rctrl",
            LeftAlt => "lalt",
            RightAlt => "ralt",

            // digits as spelled by other toolkits
            Digit0 => "d0",
            Digit1 => "d1",
            Digit2 => "d2",
            Digit3 => "d3",
            Digit4 => "d4",
            Digit5 => "d5",
            Digit6 => "d6",
            Digit7 => "d7",
            Digit8 => "d8",
            Digit9 => "d9",

            // OEM punctuation
            Semicolon => "oem1",
            Semicolon => "oemsemicolon",
            Plus => "oemplus",
            Plus => "equal",
            Comma => "oemcomma",
            Minus => "oemminus",
            Period => "oemperiod",
            Slash => "oem2",
            Slash => "oemquestion",
            Grave => "oem3",
            Grave => "oemtilde",
            LeftBracket => "oem4",
            LeftBracket => "oemopenbrackets",
            Backslash => "oem5",
            Backslash => "oempipe",
            RightBracket => "oem6",
            RightBracket => "oemclosebrackets",
            Quote => "oem7",
            Quote => "oemquotes",
        }
    };
}

/// Parses a key name into a `Key`.
///
/// Tries a case-insensitive variant name first, then exact symbol shorthands
/// (digits and punctuation), then case-insensitive aliases.
pub fn from_spec(s: &str) -> Option<Key> {
    if let Some(k) = Key::from_name(s) {
        return Some(k);
    }
    if let some @ Some(_) = key_spec_map!(from_spec_match, s) {
        return some;
    }
    let lowered = s.to_ascii_lowercase();
    key_spec_aliases!(from_spec_match, lowered.as_str())
}

impl Key {
    /// Looks up a key by its variant name, ignoring ASCII case.
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
    }

    /// Parses a key specification: a variant name, a symbol shorthand or an
    /// alias. Returns `None` if nothing matches.
    pub fn from_spec(s: &str) -> Option<Self> {
        from_spec(s)
    }
}
