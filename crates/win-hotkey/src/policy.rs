use std::collections::HashSet;

use win_keycode::{Chord, Key, Modifiers};

/// The hook-level facts about one keyboard event, decoupled from the OS
/// structures so the matching policy can be tested anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEventInfo {
    /// Virtual-key code reported by the hook.
    pub vk: u16,
    /// True for key-down (including system key-down), false for key-up.
    pub key_down: bool,
    /// True if the event was synthesized with `SendInput` or similar.
    pub injected: bool,
    /// Modifier keys held at the time of the event.
    pub modifiers: Modifiers,
}

/// Decide which registered chord, if any, a keyboard event triggers.
///
/// - Key-up events never trigger.
/// - Injected events never trigger, so synthesized input cannot re-enter.
/// - Modifier keys alone never trigger.
/// - Unknown virtual keys never trigger.
/// - Otherwise the event triggers iff `(modifiers, key)` is registered.
///
/// The caller always forwards the event to the next hook regardless of the
/// result; a match only produces a notification.
pub fn classify(bindings: &HashSet<Chord>, ev: KeyEventInfo) -> Option<Chord> {
    if !ev.key_down || ev.injected {
        return None;
    }
    let key = Key::from_vk(ev.vk)?;
    if key.is_modifier() {
        return None;
    }
    let chord = Chord::new(ev.modifiers, key);
    bindings.contains(&chord).then_some(chord)
}

/// Build a modifier set from the pressed state of each modifier family.
pub fn modifiers_from_state(ctrl: bool, alt: bool, shift: bool, win: bool) -> Modifiers {
    let mut m = Modifiers::empty();
    m.set(Modifiers::CTRL, ctrl);
    m.set(Modifiers::ALT, alt);
    m.set(Modifiers::SHIFT, shift);
    m.set(Modifiers::WIN, win);
    m
}
