//! Linux X11 input simulation via the XTest extension.
//!
//! `XTestFakeKeyEvent` and `XTestFakeButtonEvent` synthesise input that the
//! focused window cannot tell apart from hardware.  XTest takes server
//! keycodes, not KeySyms, so every key goes through
//! `KeySym → XKeysymToKeycode → keycode` against the live keyboard map.
//!
//! X11 has no wheel API: each scroll line is a press/release of button 4
//! (up) or 5 (down).
//!
//! Compiled only with the `xtest` feature, which links `libX11` and `libXtst`.

use std::os::raw::{c_int, c_uint, c_ulong};
use std::ptr;
use std::sync::Mutex;

use relay_core::keymap::KeyMapper;
use relay_core::{Key, MediaKey, Modifiers, ScrollDirection};
use x11::xlib;
use x11::xtest;

use crate::application::dispatch_action::{InputSimulator, SimulationError};

/// `CurrentTime`: let the server timestamp synthesised events.
const CURRENT_TIME: c_ulong = 0;
const BUTTON_WHEEL_UP: c_uint = 4;
const BUTTON_WHEEL_DOWN: c_uint = 5;

struct DisplayHandle(*mut xlib::Display);

// SAFETY: the pointer is only dereferenced by Xlib while the owning Mutex is held.
unsafe impl Send for DisplayHandle {}

/// XTest-backed [`InputSimulator`].
pub struct XTestInputSimulator {
    display: Mutex<DisplayHandle>,
}

impl XTestInputSimulator {
    /// Opens the display named by `$DISPLAY`.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::Platform` if the X server is unreachable.
    pub fn new() -> Result<Self, SimulationError> {
        // SAFETY: a null name selects $DISPLAY; a null return is handled below.
        let display = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display.is_null() {
            return Err(SimulationError::Platform(
                "cannot open X display (is DISPLAY set?)".into(),
            ));
        }
        Ok(Self {
            display: Mutex::new(DisplayHandle(display)),
        })
    }

    fn with_display<T>(
        &self,
        f: impl FnOnce(*mut xlib::Display) -> Result<T, SimulationError>,
    ) -> Result<T, SimulationError> {
        let guard = self
            .display
            .lock()
            .map_err(|_| SimulationError::Platform("X display lock poisoned".into()))?;
        let result = f(guard.0);
        // SAFETY: the display is open for the lifetime of `self`.
        unsafe { xlib::XFlush(guard.0) };
        result
    }
}

impl Drop for XTestInputSimulator {
    fn drop(&mut self) {
        if let Ok(guard) = self.display.lock() {
            // SAFETY: opened in `new` and closed exactly once here.
            unsafe { xlib::XCloseDisplay(guard.0) };
        }
    }
}

fn keycode(
    display: *mut xlib::Display,
    keysym: u32,
    key: Option<Key>,
) -> Result<c_uint, SimulationError> {
    // SAFETY: `display` is a live connection held under the simulator's lock.
    let code = unsafe { xlib::XKeysymToKeycode(display, keysym as xlib::KeySym) };
    if code == 0 {
        return Err(match key {
            Some(key) => SimulationError::UnmappedKey(key),
            None => SimulationError::Platform(format!("no keycode for keysym {keysym:#x}")),
        });
    }
    Ok(c_uint::from(code))
}

fn fake_key(display: *mut xlib::Display, code: c_uint, press: bool) {
    // SAFETY: `display` is live and `code` came from XKeysymToKeycode.
    unsafe { xtest::XTestFakeKeyEvent(display, code, c_int::from(press), CURRENT_TIME) };
}

fn fake_button(display: *mut xlib::Display, button: c_uint, press: bool) {
    // SAFETY: `display` is live; buttons 4 and 5 always exist on the core pointer.
    unsafe { xtest::XTestFakeButtonEvent(display, button, c_int::from(press), CURRENT_TIME) };
}

impl InputSimulator for XTestInputSimulator {
    fn has_permission(&self) -> bool {
        true
    }

    fn key_press(&self, key: Key, modifiers: Modifiers) -> Result<(), SimulationError> {
        self.with_display(|display| {
            let mods = KeyMapper::modifiers_to_x11_keysyms(modifiers)
                .into_iter()
                .map(|sym| keycode(display, sym, None))
                .collect::<Result<Vec<_>, _>>()?;
            let code = keycode(display, KeyMapper::key_to_x11_keysym(key), Some(key))?;

            for &m in &mods {
                fake_key(display, m, true);
            }
            fake_key(display, code, true);
            fake_key(display, code, false);
            for &m in mods.iter().rev() {
                fake_key(display, m, false);
            }
            Ok(())
        })
    }

    fn scroll(&self, direction: ScrollDirection, lines: u32) -> Result<(), SimulationError> {
        let button = match direction {
            ScrollDirection::Up => BUTTON_WHEEL_UP,
            ScrollDirection::Down => BUTTON_WHEEL_DOWN,
        };
        self.with_display(|display| {
            for _ in 0..lines {
                fake_button(display, button, true);
                fake_button(display, button, false);
            }
            Ok(())
        })
    }

    fn media_key(&self, key: MediaKey) -> Result<(), SimulationError> {
        self.with_display(|display| {
            let code = keycode(display, KeyMapper::media_to_x11_keysym(key), None)?;
            fake_key(display, code, true);
            fake_key(display, code, false);
            Ok(())
        })
    }
}
