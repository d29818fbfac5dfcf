use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Key, Modifiers, ParseError};

/// A key chord: a set of modifiers plus a single trigger key.
///
/// Equality and hashing are by value, so chords serve directly as map keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Chord {
    /// Modifier keys held down for this chord.
    pub modifiers: Modifiers,
    /// The trigger key.
    pub key: Key,
}

impl Chord {
    /// Creates a chord from a modifier set and a key.
    pub const fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// Parses a chord specification of the form `"Win+Shift+G"`.
    ///
    /// - Case-insensitive for both modifiers and the key.
    /// - Components are separated by `+` and trimmed; the last component is
    ///   always the key, everything before it is a modifier.
    /// - Modifiers are `ctrl`/`control`, `alt`, `shift`, `win`/`windows`;
    ///   repeating one is harmless.
    /// - The key accepts the full `Key::from_spec` space.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        if s.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key_raw = parts.pop().ok_or(ParseError::Empty)?;
        let mut modifiers = Modifiers::empty();
        for m in parts {
            let flag =
                Modifiers::from_name(m).ok_or_else(|| ParseError::UnknownModifier(m.to_string()))?;
            modifiers |= flag;
        }
        let key = Key::from_spec(key_raw).ok_or_else(|| ParseError::UnknownKey(key_raw.into()))?;
        Ok(Self { modifiers, key })
    }

    /// Returns the canonical string form of this chord: modifiers in the
    /// order Ctrl, Alt, Shift, Win, then the key name, joined with `+`.
    pub fn to_string_canonical(&self) -> String {
        let mut out: Vec<&str> = self.modifiers.names().collect();
        out.push(self.key.name());
        out.join("+")
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_canonical())
    }
}

impl FromStr for Chord {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Chord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_canonical())
    }
}

impl<'de> Deserialize<'de> for Chord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::{prelude::*, sample::select};

    use super::*;

    #[test]
    fn parse_single_modifier() {
        let c = Chord::parse("Win+F").expect("parse");
        assert_eq!(c.modifiers, Modifiers::WIN);
        assert_eq!(c.key, Key::F);
    }

    #[test]
    fn parse_all_modifiers() {
        let c = Chord::parse("Ctrl+Alt+Shift+Win+F1").expect("parse");
        assert_eq!(c.modifiers, Modifiers::all());
        assert_eq!(c.key, Key::F1);
        assert_eq!(c.to_string(), "Ctrl+Alt+Shift+Win+F1");
    }

    #[test]
    fn parse_key_only() {
        let c = Chord::parse("A").expect("parse");
        assert!(c.modifiers.is_empty());
        assert_eq!(c.key, Key::A);
        assert_eq!(c.to_string(), "A");
    }

    #[test]
    fn alternate_spellings_case_and_spaces() {
        let c = Chord::parse("Control+A").expect("parse");
        assert_eq!(c.modifiers, Modifiers::CTRL);
        let c = Chord::parse("Windows+F").expect("parse");
        assert_eq!(c.modifiers, Modifiers::WIN);
        let c = Chord::parse("win+shift+f").expect("parse");
        assert_eq!(c.modifiers, Modifiers::WIN | Modifiers::SHIFT);
        assert_eq!(c.key, Key::F);
        let c = Chord::parse("Win + Shift + G").expect("parse");
        assert_eq!(c.modifiers, Modifiers::WIN | Modifiers::SHIFT);
        assert_eq!(c.key, Key::G);
    }

    #[test]
    fn repeated_modifier_is_idempotent() {
        let c = Chord::parse("ctrl+Control+k").expect("parse");
        assert_eq!(c.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            Chord::parse("Super+F"),
            Err(ParseError::UnknownModifier("Super".into()))
        );
        assert_eq!(
            Chord::parse("Win+NotAKey"),
            Err(ParseError::UnknownKey("NotAKey".into()))
        );
        assert_eq!(Chord::parse(""), Err(ParseError::Empty));
        assert_eq!(Chord::parse("   "), Err(ParseError::Empty));
        assert_eq!(Chord::parse("Win+"), Err(ParseError::UnknownKey("".into())));
    }

    #[test]
    fn format_orders_modifiers() {
        let c = Chord::new(Modifiers::SHIFT | Modifiers::CTRL, Key::G);
        assert_eq!(c.to_string(), "Ctrl+Shift+G");
        assert_eq!(Chord::new(Modifiers::empty(), Key::A).to_string(), "A");
        let c = Chord::parse("Shift+Win+G").expect("parse");
        assert_eq!(c.to_string(), "Shift+Win+G");
        let c = Chord::parse("win+ALT+pgdn").expect("parse");
        assert_eq!(c.to_string(), "Alt+Win+PageDown");
    }

    #[test]
    fn idempotence_roundtrip() {
        let inputs = ["Shift+Win+G", "CTRL+ALT+Space", "windows+1", "alt + esc"];
        for s in inputs {
            let c = Chord::parse(s).expect("parse");
            let spec = c.to_string();
            let c2 = Chord::parse(&spec).expect("reparse");
            assert_eq!(c, c2, "idempotent for {} => {}", s, spec);
            assert_eq!(c2.to_string(), spec);
        }
    }

    #[test]
    fn serde_uses_canonical_string() {
        let c = Chord::parse("shift+ctrl+k").expect("parse");
        let json = serde_json::to_string(&c).expect("serialize");
        assert_eq!(json, "\"Ctrl+Shift+K\"");
        let back: Chord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, c);
        assert!(serde_json::from_str::<Chord>("\"Super+K\"").is_err());
    }

    fn any_chord() -> impl Strategy<Value = Chord> {
        (0u8..16, select(Key::ALL.to_vec())).prop_map(|(bits, key)| {
            Chord::new(Modifiers::from_bits_truncate(bits), key)
        })
    }

    proptest! {
        #[test]
        fn format_then_parse_is_identity(c in any_chord()) {
            let s = c.to_string();
            prop_assert_eq!(Chord::parse(&s), Ok(c));
        }

        #[test]
        fn lowercased_canonical_parses_back(c in any_chord()) {
            let s = c.to_string().to_ascii_lowercase();
            let once = Chord::parse(&s).expect("parse");
            let twice = Chord::parse(&once.to_string()).expect("reparse");
            prop_assert_eq!(once, twice);
            prop_assert_eq!(once, c);
        }
    }
}
