//! win-keycode: Virtual keys, modifiers and chords for Windows.
//!
//! - `Key`: Enum of the Windows virtual keys we can bind, `repr(u16)` with
//!   the exact `VK_*` values.
//! - `Modifiers`: Bitset over Ctrl, Alt, Shift and Win.
//! - `Chord`: A modifier set plus a trigger key, with a canonical string form
//!   (`Ctrl+Alt+Shift+Win+Key`) and a case-insensitive parser.
//!
//! Key names are the enum variant names (`A`, `F1`, `PageUp`, `Digit1`...).
//! The parser additionally accepts common aliases (`esc`, `pgdn`, `1`, `,`).

mod key;
pub use key::Key;

mod spec;

mod modifiers;
pub use modifiers::Modifiers;

mod chord;
pub use chord::Chord;

mod error;
pub use error::ParseError;

mod vk;
pub use vk::VirtualKey;
