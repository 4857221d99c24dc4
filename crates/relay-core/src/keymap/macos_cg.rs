//! macOS `CGKeyCode` table.
//!
//! CGKeyCode values are defined in Carbon Events.h (HIToolbox framework).
//! They name physical ANSI key positions, not characters.

use crate::domain::input::{Key, MediaKey, Modifiers};

/// `kCGEventFlagMaskShift`.
pub const FLAG_MASK_SHIFT: u64 = 0x0002_0000;
/// `kCGEventFlagMaskControl`.
pub const FLAG_MASK_CONTROL: u64 = 0x0004_0000;
/// `kCGEventFlagMaskAlternate`.
pub const FLAG_MASK_ALTERNATE: u64 = 0x0008_0000;
/// `kCGEventFlagMaskCommand`.
pub const FLAG_MASK_COMMAND: u64 = 0x0010_0000;

/// Translates a [`Key`] to a macOS `CGKeyCode` value.
pub fn key_to_cgkeycode(key: Key) -> u16 {
    match key {
        Key::Digit1 => 0x12,     // kVK_ANSI_1
        Key::Digit2 => 0x13,     // kVK_ANSI_2
        Key::Digit3 => 0x14,     // kVK_ANSI_3
        Key::Digit4 => 0x15,     // kVK_ANSI_4
        Key::Space => 0x31,      // kVK_Space
        Key::ArrowUp => 0x7E,    // kVK_UpArrow
        Key::ArrowDown => 0x7D,  // kVK_DownArrow
        Key::ArrowLeft => 0x7B,  // kVK_LeftArrow
        Key::ArrowRight => 0x7C, // kVK_RightArrow
        Key::Return => 0x24,     // kVK_Return
        Key::F5 => 0x60,         // kVK_F5
        Key::KeyR => 0x0F,       // kVK_ANSI_R
    }
}

/// Translates [`Modifiers`] to a `CGEventFlags` bitmask.
pub fn modifiers_to_event_flags(modifiers: Modifiers) -> u64 {
    let mut flags = 0;
    if modifiers.command() {
        flags |= FLAG_MASK_COMMAND;
    }
    if modifiers.control() {
        flags |= FLAG_MASK_CONTROL;
    }
    if modifiers.alt() {
        flags |= FLAG_MASK_ALTERNATE;
    }
    if modifiers.shift() {
        flags |= FLAG_MASK_SHIFT;
    }
    flags
}

/// Translates a [`MediaKey`] to the IOKit `NX_KEYTYPE_*` value carried in a
/// system-defined event.
pub fn media_to_nx_keytype(key: MediaKey) -> i32 {
    match key {
        MediaKey::PlayPause => 16, // NX_KEYTYPE_PLAY
    }
}
