//! X11 KeySym table for Linux desktops.
//!
//! XTest injects *keycodes*, so the simulator resolves each KeySym with
//! `XKeysymToKeycode` against the live display.

use crate::domain::input::{Key, MediaKey, Modifiers};

pub const XK_SHIFT_L: u32 = 0xFFE1;
pub const XK_CONTROL_L: u32 = 0xFFE3;
pub const XK_ALT_L: u32 = 0xFFE9;
pub const XK_SUPER_L: u32 = 0xFFEB;

/// Translates a [`Key`] to an X11 KeySym value.
pub fn key_to_keysym(key: Key) -> u32 {
    match key {
        Key::Digit1 => 0x0031,     // XK_1
        Key::Digit2 => 0x0032,     // XK_2
        Key::Digit3 => 0x0033,     // XK_3
        Key::Digit4 => 0x0034,     // XK_4
        Key::Space => 0x0020,      // XK_space
        Key::ArrowUp => 0xFF52,    // XK_Up
        Key::ArrowDown => 0xFF54,  // XK_Down
        Key::ArrowLeft => 0xFF51,  // XK_Left
        Key::ArrowRight => 0xFF53, // XK_Right
        Key::Return => 0xFF0D,     // XK_Return
        Key::F5 => 0xFFC2,         // XK_F5
        Key::KeyR => 0x0072,       // XK_r
    }
}

/// Returns the modifier KeySyms for `modifiers`.  Command maps to Super.
pub fn modifier_keysyms(modifiers: Modifiers) -> Vec<u32> {
    let mut keysyms = Vec::new();
    if modifiers.control() {
        keysyms.push(XK_CONTROL_L);
    }
    if modifiers.alt() {
        keysyms.push(XK_ALT_L);
    }
    if modifiers.shift() {
        keysyms.push(XK_SHIFT_L);
    }
    if modifiers.command() {
        keysyms.push(XK_SUPER_L);
    }
    keysyms
}

/// Translates a [`MediaKey`] to its `XF86` KeySym.
pub fn media_to_keysym(key: MediaKey) -> u32 {
    match key {
        MediaKey::PlayPause => 0x1008_FF14, // XF86XK_AudioPlay
    }
}
