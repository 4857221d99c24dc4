//! Platform-neutral description of a simulated input event.
//!
//! The dispatcher resolves every recognised command into exactly one
//! [`SimulatedInput`].  The platform simulators translate the contained
//! [`Key`] / [`MediaKey`] through [`crate::keymap::KeyMapper`] at the last
//! moment.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keys the command vocabulary can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Return,
    F5,
    KeyR,
}

impl Key {
    /// Every key, in declaration order.  Used by table-coverage tests and benches.
    pub const ALL: [Key; 12] = [
        Key::Digit1,
        Key::Digit2,
        Key::Digit3,
        Key::Digit4,
        Key::Space,
        Key::ArrowUp,
        Key::ArrowDown,
        Key::ArrowLeft,
        Key::ArrowRight,
        Key::Return,
        Key::F5,
        Key::KeyR,
    ];
}

/// Hardware media keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKey {
    PlayPause,
}

/// Held modifiers for a key press, as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    /// macOS Command key.
    pub const COMMAND: Modifiers = Modifiers(1 << 0);
    pub const CONTROL: Modifiers = Modifiers(1 << 1);
    pub const ALT: Modifiers = Modifiers(1 << 2);
    pub const SHIFT: Modifiers = Modifiers(1 << 3);

    /// Returns `true` if every bit in `other` is set in `self`.
    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn command(self) -> bool {
        self.contains(Self::COMMAND)
    }

    pub fn control(self) -> bool {
        self.contains(Self::CONTROL)
    }

    pub fn alt(self) -> bool {
        self.contains(Self::ALT)
    }

    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// Scroll wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// Signed wheel delta for `lines`: positive scrolls up, negative scrolls down.
    pub fn signed_lines(self, lines: u32) -> i32 {
        let lines = i32::try_from(lines).unwrap_or(i32::MAX);
        match self {
            ScrollDirection::Up => lines,
            ScrollDirection::Down => -lines,
        }
    }
}

/// One simulated input, ready to be handed to a platform simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulatedInput {
    /// Press and release `key` while `modifiers` are held.
    KeyPress { key: Key, modifiers: Modifiers },
    /// Scroll the wheel by `lines` line units.
    Scroll { direction: ScrollDirection, lines: u32 },
    /// Press and release a media key.
    Media(MediaKey),
}

impl fmt::Display for SimulatedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatedInput::KeyPress { key, modifiers } if modifiers.is_empty() => {
                write!(f, "key {key:?}")
            }
            SimulatedInput::KeyPress { key, modifiers } => {
                write!(f, "key {key:?} with modifiers {:#06b}", modifiers.0)
            }
            SimulatedInput::Scroll { direction, lines } => {
                write!(f, "scroll {direction:?} {lines} lines")
            }
            SimulatedInput::Media(key) => write!(f, "media {key:?}"),
        }
    }
}

/// Desktop operating system family, used to pick shortcuts and key tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
}

impl Platform {
    /// Returns the platform of the compilation target.
    ///
    /// Targets other than macOS and Windows use the Linux/X11 conventions.
    pub fn current() -> Self {
        #[cfg(target_os = "macos")]
        return Platform::MacOs;
        #[cfg(target_os = "windows")]
        return Platform::Windows;
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        return Platform::Linux;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
