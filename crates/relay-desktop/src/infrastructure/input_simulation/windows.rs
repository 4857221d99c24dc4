//! Windows input simulation via the SendInput API.
//!
//! A key press with modifiers is sent as one `SendInput` batch (modifiers
//! down, key down, key up, modifiers up) so no other input can interleave.
//! One wheel line is `WHEEL_DELTA` (120) units.

#![cfg(target_os = "windows")]

use relay_core::keymap::{windows_vk, KeyMapper};
use relay_core::{Key, MediaKey, Modifiers, ScrollDirection};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, MOUSEEVENTF_WHEEL, MOUSEINPUT, VIRTUAL_KEY,
};

use crate::application::dispatch_action::{InputSimulator, SimulationError};

const WHEEL_DELTA: i32 = 120;

/// Windows implementation of [`InputSimulator`] using SendInput.
pub struct WindowsInputSimulator;

impl WindowsInputSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsInputSimulator {
    fn default() -> Self {
        Self::new()
    }
}

fn key_input(vk: u8, key_up: bool) -> INPUT {
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    if windows_vk::is_extended_vk(vk) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(u16::from(vk)),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

/// Builds the down/up sequence for `vk` with `modifiers` held around it.
fn key_sequence(vk: u8, modifier_vks: &[u8]) -> Vec<INPUT> {
    let mut inputs = Vec::with_capacity(modifier_vks.len() * 2 + 2);
    inputs.extend(modifier_vks.iter().map(|&m| key_input(m, false)));
    inputs.push(key_input(vk, false));
    inputs.push(key_input(vk, true));
    inputs.extend(modifier_vks.iter().rev().map(|&m| key_input(m, true)));
    inputs
}

fn send(inputs: &[INPUT]) -> Result<(), SimulationError> {
    // SAFETY: every element is a fully initialised INPUT and cbSize matches.
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize != inputs.len() {
        return Err(SimulationError::Platform(format!(
            "SendInput injected {sent} of {} events",
            inputs.len()
        )));
    }
    Ok(())
}

impl InputSimulator for WindowsInputSimulator {
    fn has_permission(&self) -> bool {
        true
    }

    fn key_press(&self, key: Key, modifiers: Modifiers) -> Result<(), SimulationError> {
        let vk = KeyMapper::key_to_windows_vk(key);
        send(&key_sequence(vk, &KeyMapper::modifiers_to_windows_vks(modifiers)))
    }

    fn scroll(&self, direction: ScrollDirection, lines: u32) -> Result<(), SimulationError> {
        let delta = direction.signed_lines(lines).saturating_mul(WHEEL_DELTA);
        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: delta as u32,
                    dwFlags: MOUSEEVENTF_WHEEL,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };
        send(&[input])
    }

    fn media_key(&self, key: MediaKey) -> Result<(), SimulationError> {
        send(&key_sequence(KeyMapper::media_to_windows_vk(key), &[]))
    }
}
