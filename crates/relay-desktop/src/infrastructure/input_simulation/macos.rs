//! macOS input simulation through CoreGraphics.
//!
//! Key presses and wheel scrolls are `CGEvent`s posted at the HID event tap,
//! the same level as physical hardware.  The media Play/Pause key has no
//! `CGKeyCode`; it is an AppKit system-defined event (subtype 8) whose
//! `data1` packs the `NX_KEYTYPE_*` value with a down/up state, converted to
//! a `CGEvent` before posting.  That `NSEvent` is autoreleased, and the
//! calling thread is a tokio worker with no run loop, so the conversion runs
//! inside its own autorelease pool.
//!
//! # Accessibility permission
//!
//! Posting at `kCGHIDEventTap` needs the process to be trusted under
//! System Settings → Privacy & Security → Accessibility.  Without it the
//! post silently does nothing, so [`MacosInputSimulator::has_permission`] asks
//! `AXIsProcessTrusted` before every command.

#![cfg(target_os = "macos")]

use std::ffi::{c_char, c_void};

use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, ScrollEventUnit};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use relay_core::keymap::KeyMapper;
use relay_core::{Key, MediaKey, Modifiers, ScrollDirection};

use crate::application::dispatch_action::{InputSimulator, SimulationError};

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
}

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventPost(tap: u32, event: *mut c_void);
}

#[link(name = "AppKit", kind = "framework")]
extern "C" {}

#[link(name = "objc")]
extern "C" {
    fn objc_getClass(name: *const c_char) -> *mut c_void;
    fn sel_registerName(name: *const c_char) -> *mut c_void;
    fn objc_msgSend();
    fn objc_autoreleasePoolPush() -> *mut c_void;
    fn objc_autoreleasePoolPop(pool: *mut c_void);
}

/// `NSEventTypeSystemDefined`.
const NS_EVENT_TYPE_SYSTEM_DEFINED: u64 = 14;
/// Subtype used by the auxiliary (media) keys.
const NX_SUBTYPE_AUX_CONTROL_BUTTONS: i16 = 8;
const NX_KEYDOWN_STATE: isize = 0xA;
const NX_KEYUP_STATE: isize = 0xB;
/// `kCGHIDEventTap`.
const HID_EVENT_TAP: u32 = 0;

/// CoreGraphics-backed [`InputSimulator`].
///
/// Each call creates its own `CGEventSource`; CoreFoundation objects are not
/// `Send`, and a source per command is cheap next to the network round trip.
pub struct MacosInputSimulator;

impl MacosInputSimulator {
    /// Creates the simulator after checking an event source can be created.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::Platform` if the HID event source is unavailable.
    pub fn new() -> Result<Self, SimulationError> {
        event_source()?;
        Ok(Self)
    }
}

fn event_source() -> Result<CGEventSource, SimulationError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| SimulationError::Platform("CGEventSourceCreate failed".into()))
}

fn post_key(key_code: u16, flags: CGEventFlags, down: bool) -> Result<(), SimulationError> {
    let event = CGEvent::new_keyboard_event(event_source()?, key_code, down)
        .map_err(|_| SimulationError::Platform("CGEventCreateKeyboardEvent failed".into()))?;
    event.set_flags(flags);
    event.post(CGEventTapLocation::HID);
    Ok(())
}

/// An Objective-C autorelease pool, drained when dropped.
struct AutoreleasePool(*mut c_void);

impl AutoreleasePool {
    fn push() -> Self {
        // SAFETY: pushing a pool has no preconditions; the token is only
        // passed back to objc_autoreleasePoolPop on the same thread.
        Self(unsafe { objc_autoreleasePoolPush() })
    }
}

impl Drop for AutoreleasePool {
    fn drop(&mut self) {
        // SAFETY: `self.0` came from objc_autoreleasePoolPush on this thread and
        // the guard is `!Send`, so pools are popped in LIFO order.
        unsafe { objc_autoreleasePoolPop(self.0) }
    }
}

/// Runs `f` inside a fresh autorelease pool.
fn with_autorelease_pool<T>(f: impl FnOnce() -> T) -> T {
    let _pool = AutoreleasePool::push();
    f()
}

/// Builds and posts one system-defined media key event.
fn post_media_event(nx_keytype: i32, down: bool) -> Result<(), SimulationError> {
    let state = if down { NX_KEYDOWN_STATE } else { NX_KEYUP_STATE };
    let data1 = ((nx_keytype as isize) << 16) | (state << 8);
    let modifier_flags = (state as u64) << 8;

    type OtherEventFn = unsafe extern "C" fn(
        *mut c_void,
        *mut c_void,
        u64,
        CGPoint,
        u64,
        f64,
        isize,
        *mut c_void,
        i16,
        isize,
        isize,
    ) -> *mut c_void;
    type GetterFn = unsafe extern "C" fn(*mut c_void, *mut c_void) -> *mut c_void;

    // SAFETY: the selectors and argument types match the AppKit declarations of
    // +[NSEvent otherEventWithType:location:modifierFlags:timestamp:windowNumber:
    // context:subtype:data1:data2:] and -[NSEvent CGEvent]; objc_msgSend is
    // called through a correctly typed function pointer as the runtime requires.
    unsafe {
        let class = objc_getClass(b"NSEvent\0".as_ptr().cast());
        if class.is_null() {
            return Err(SimulationError::Platform("NSEvent class unavailable".into()));
        }
        let make_sel = sel_registerName(
            b"otherEventWithType:location:modifierFlags:timestamp:windowNumber:context:subtype:data1:data2:\0"
                .as_ptr()
                .cast(),
        );
        let cg_sel = sel_registerName(b"CGEvent\0".as_ptr().cast());

        let make: OtherEventFn = std::mem::transmute(objc_msgSend as unsafe extern "C" fn());
        let get: GetterFn = std::mem::transmute(objc_msgSend as unsafe extern "C" fn());

        let ns_event = make(
            class,
            make_sel,
            NS_EVENT_TYPE_SYSTEM_DEFINED,
            CGPoint::new(0.0, 0.0),
            modifier_flags,
            0.0,
            0,
            std::ptr::null_mut(),
            NX_SUBTYPE_AUX_CONTROL_BUTTONS,
            data1,
            -1,
        );
        if ns_event.is_null() {
            return Err(SimulationError::Platform("NSEvent creation failed".into()));
        }
        let cg_event = get(ns_event, cg_sel);
        if cg_event.is_null() {
            return Err(SimulationError::Platform("NSEvent has no CGEvent".into()));
        }
        CGEventPost(HID_EVENT_TAP, cg_event);
    }
    Ok(())
}

impl InputSimulator for MacosInputSimulator {
    fn has_permission(&self) -> bool {
        // SAFETY: AXIsProcessTrusted takes no arguments and has no preconditions.
        unsafe { AXIsProcessTrusted() }
    }

    fn key_press(&self, key: Key, modifiers: Modifiers) -> Result<(), SimulationError> {
        let key_code = KeyMapper::key_to_macos_cgkeycode(key);
        let bits = KeyMapper::modifiers_to_macos_flags(modifiers);
        let flags = CGEventFlags::from_bits_truncate(bits);
        post_key(key_code, flags, true)?;
        post_key(key_code, flags, false)
    }

    fn scroll(&self, direction: ScrollDirection, lines: u32) -> Result<(), SimulationError> {
        let event = CGEvent::new_scroll_event(
            event_source()?,
            ScrollEventUnit::LINE,
            1,
            direction.signed_lines(lines),
            0,
            0,
        )
        .map_err(|_| SimulationError::Platform("CGEventCreateScrollWheelEvent failed".into()))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn media_key(&self, key: MediaKey) -> Result<(), SimulationError> {
        let keytype = KeyMapper::media_to_macos_nx_keytype(key);
        with_autorelease_pool(|| {
            post_media_event(keytype, true)?;
            post_media_event(keytype, false)
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
