//! Key code translation tables for the simulated-input layer.
//!
//! The command vocabulary only ever presses a dozen keys, so each platform
//! table is total: every [`Key`] has a native code on every platform, and the
//! lookups return plain values instead of `Option`.

pub mod linux_x11;
pub mod macos_cg;
pub mod windows_vk;

use crate::domain::input::{Key, MediaKey, Modifiers};

/// Unified key mapper providing all translation directions.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a [`Key`] to a macOS `CGKeyCode` value.
    pub fn key_to_macos_cgkeycode(key: Key) -> u16 {
        macos_cg::key_to_cgkeycode(key)
    }

    /// Translates [`Modifiers`] to a macOS `CGEventFlags` bitmask.
    pub fn modifiers_to_macos_flags(modifiers: Modifiers) -> u64 {
        macos_cg::modifiers_to_event_flags(modifiers)
    }

    /// Translates a [`MediaKey`] to the macOS `NX_KEYTYPE_*` value.
    pub fn media_to_macos_nx_keytype(key: MediaKey) -> i32 {
        macos_cg::media_to_nx_keytype(key)
    }

    /// Translates a [`Key`] to an X11 KeySym value for Linux desktops.
    pub fn key_to_x11_keysym(key: Key) -> u32 {
        linux_x11::key_to_keysym(key)
    }

    /// Returns the X11 KeySyms to hold down for `modifiers`, in press order.
    pub fn modifiers_to_x11_keysyms(modifiers: Modifiers) -> Vec<u32> {
        linux_x11::modifier_keysyms(modifiers)
    }

    /// Translates a [`MediaKey`] to its `XF86` KeySym.
    pub fn media_to_x11_keysym(key: MediaKey) -> u32 {
        linux_x11::media_to_keysym(key)
    }

    /// Translates a [`Key`] to a Windows Virtual Key code.
    pub fn key_to_windows_vk(key: Key) -> u8 {
        windows_vk::key_to_vk(key)
    }

    /// Returns the Windows VK codes to hold down for `modifiers`, in press order.
    pub fn modifiers_to_windows_vks(modifiers: Modifiers) -> Vec<u8> {
        windows_vk::modifier_vks(modifiers)
    }

    /// Translates a [`MediaKey`] to its Windows `VK_MEDIA_*` code.
    pub fn media_to_windows_vk(key: MediaKey) -> u8 {
        windows_vk::media_to_vk(key)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_distinct_code_on_each_platform() {
        use std::collections::HashSet;

        let mac: HashSet<_> = Key::ALL
            .iter()
            .map(|&k| KeyMapper::key_to_macos_cgkeycode(k))
            .collect();
        let x11: HashSet<_> = Key::ALL.iter().map(|&k| KeyMapper::key_to_x11_keysym(k)).collect();
        let win: HashSet<_> = Key::ALL.iter().map(|&k| KeyMapper::key_to_windows_vk(k)).collect();

        assert_eq!(mac.len(), Key::ALL.len());
        assert_eq!(x11.len(), Key::ALL.len());
        assert_eq!(win.len(), Key::ALL.len());
    }

    #[test]
    fn test_media_key_translations() {
        assert_eq!(KeyMapper::media_to_macos_nx_keytype(MediaKey::PlayPause), 16);
        assert_eq!(KeyMapper::media_to_x11_keysym(MediaKey::PlayPause), 0x1008_FF14);
        assert_eq!(KeyMapper::media_to_windows_vk(MediaKey::PlayPause), 0xB3);
    }
}
