//! Windows Virtual Key code table.

use crate::domain::input::{Key, MediaKey, Modifiers};

pub const VK_SHIFT: u8 = 0x10;
pub const VK_CONTROL: u8 = 0x11;
pub const VK_MENU: u8 = 0x12;
pub const VK_LWIN: u8 = 0x5B;

/// Translates a [`Key`] to a Windows Virtual Key code.
pub fn key_to_vk(key: Key) -> u8 {
    match key {
        Key::Digit1 => 0x31,
        Key::Digit2 => 0x32,
        Key::Digit3 => 0x33,
        Key::Digit4 => 0x34,
        Key::Space => 0x20,      // VK_SPACE
        Key::ArrowUp => 0x26,    // VK_UP
        Key::ArrowDown => 0x28,  // VK_DOWN
        Key::ArrowLeft => 0x25,  // VK_LEFT
        Key::ArrowRight => 0x27, // VK_RIGHT
        Key::Return => 0x0D,     // VK_RETURN
        Key::F5 => 0x74,         // VK_F5
        Key::KeyR => 0x52,
    }
}

/// Returns the modifier VK codes for `modifiers`.  Command maps to the left Windows key.
pub fn modifier_vks(modifiers: Modifiers) -> Vec<u8> {
    let mut vks = Vec::new();
    if modifiers.control() {
        vks.push(VK_CONTROL);
    }
    if modifiers.alt() {
        vks.push(VK_MENU);
    }
    if modifiers.shift() {
        vks.push(VK_SHIFT);
    }
    if modifiers.command() {
        vks.push(VK_LWIN);
    }
    vks
}

/// Translates a [`MediaKey`] to its `VK_MEDIA_*` code.
pub fn media_to_vk(key: MediaKey) -> u8 {
    match key {
        MediaKey::PlayPause => 0xB3, // VK_MEDIA_PLAY_PAUSE
    }
}

/// Returns `true` for keys that need `KEYEVENTF_EXTENDEDKEY` in `SendInput`.
pub fn is_extended_vk(vk: u8) -> bool {
    matches!(vk, 0x25..=0x28 | VK_LWIN | 0xB3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_and_letters_use_ascii_values() {
        assert_eq!(key_to_vk(Key::Digit3), b'3');
        assert_eq!(key_to_vk(Key::KeyR), b'R');
    }

    #[test]
    fn test_control_plus_alt_keeps_press_order() {
        assert_eq!(
            modifier_vks(Modifiers::CONTROL | Modifiers::ALT),
            vec![VK_CONTROL, VK_MENU]
        );
    }

    #[test]
    fn test_arrow_keys_are_extended() {
        assert!(is_extended_vk(key_to_vk(Key::ArrowLeft)));
        assert!(!is_extended_vk(key_to_vk(Key::Return)));
    }
}
