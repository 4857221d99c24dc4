//! The closed command vocabulary and its mapping to simulated input.
//!
//! | type          | action        | input                                    |
//! |---------------|---------------|------------------------------------------|
//! | `anki_action` | `anki_1`..`4` | key `1`..`4`                             |
//! | `anki_action` | `anki_space`  | Space                                    |
//! | `gesture`     | `scroll_down` | wheel down                               |
//! | `gesture`     | `scroll_up`   | wheel up                                 |
//! | `gesture`     | `tap`         | Return                                   |
//! | `gesture`     | `back`        | Cmd+Left (macOS), Alt+Left (others)      |
//! | `gesture`     | `refresh`     | Cmd+R (macOS), Ctrl+R (others)           |
//! | `gesture`     | `play_pause`  | media Play/Pause                         |

use crate::domain::input::{Key, MediaKey, Modifiers, Platform, ScrollDirection, SimulatedInput};

/// Default number of wheel lines per scroll gesture.
pub const DEFAULT_SCROLL_LINES: u32 = 5;

/// Wrist gestures recognised by the companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureAction {
    ScrollDown,
    ScrollUp,
    Tap,
    Back,
    Refresh,
    PlayPause,
}

/// Flashcard-review answers (Anki's default review shortcuts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnkiAction {
    /// "Again".
    One,
    /// "Hard".
    Two,
    /// "Good".
    Three,
    /// "Easy".
    Four,
    /// Show answer.
    Space,
}

/// A recognised command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayCommand {
    Gesture(GestureAction),
    Anki(AnkiAction),
}

impl GestureAction {
    pub const ALL: [GestureAction; 6] = [
        GestureAction::ScrollDown,
        GestureAction::ScrollUp,
        GestureAction::Tap,
        GestureAction::Back,
        GestureAction::Refresh,
        GestureAction::PlayPause,
    ];

    /// Parses a wire action identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scroll_down" => Some(Self::ScrollDown),
            "scroll_up" => Some(Self::ScrollUp),
            "tap" => Some(Self::Tap),
            "back" => Some(Self::Back),
            "refresh" => Some(Self::Refresh),
            "play_pause" => Some(Self::PlayPause),
            _ => None,
        }
    }

    /// Returns the wire action identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ScrollDown => "scroll_down",
            Self::ScrollUp => "scroll_up",
            Self::Tap => "tap",
            Self::Back => "back",
            Self::Refresh => "refresh",
            Self::PlayPause => "play_pause",
        }
    }
}

impl AnkiAction {
    pub const ALL: [AnkiAction; 5] = [
        AnkiAction::One,
        AnkiAction::Two,
        AnkiAction::Three,
        AnkiAction::Four,
        AnkiAction::Space,
    ];

    /// Parses a wire action identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "anki_1" => Some(Self::One),
            "anki_2" => Some(Self::Two),
            "anki_3" => Some(Self::Three),
            "anki_4" => Some(Self::Four),
            "anki_space" => Some(Self::Space),
            _ => None,
        }
    }

    /// Returns the wire action identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "anki_1",
            Self::Two => "anki_2",
            Self::Three => "anki_3",
            Self::Four => "anki_4",
            Self::Space => "anki_space",
        }
    }
}

impl RelayCommand {
    /// Every recognised command.
    pub fn all() -> impl Iterator<Item = RelayCommand> {
        GestureAction::ALL
            .into_iter()
            .map(RelayCommand::Gesture)
            .chain(AnkiAction::ALL.into_iter().map(RelayCommand::Anki))
    }
}

/// Resolves a command into the single input it produces on `platform`.
///
/// `scroll_lines` is the wheel distance used by the two scroll gestures.
pub fn resolve(command: RelayCommand, platform: Platform, scroll_lines: u32) -> SimulatedInput {
    match command {
        RelayCommand::Anki(action) => SimulatedInput::KeyPress {
            key: match action {
                AnkiAction::One => Key::Digit1,
                AnkiAction::Two => Key::Digit2,
                AnkiAction::Three => Key::Digit3,
                AnkiAction::Four => Key::Digit4,
                AnkiAction::Space => Key::Space,
            },
            modifiers: Modifiers::NONE,
        },
        RelayCommand::Gesture(action) => match action {
            GestureAction::ScrollDown => SimulatedInput::Scroll {
                direction: ScrollDirection::Down,
                lines: scroll_lines,
            },
            GestureAction::ScrollUp => SimulatedInput::Scroll {
                direction: ScrollDirection::Up,
                lines: scroll_lines,
            },
            GestureAction::Tap => SimulatedInput::KeyPress {
                key: Key::Return,
                modifiers: Modifiers::NONE,
            },
            GestureAction::Back => SimulatedInput::KeyPress {
                key: Key::ArrowLeft,
                modifiers: match platform {
                    Platform::MacOs => Modifiers::COMMAND,
                    Platform::Linux | Platform::Windows => Modifiers::ALT,
                },
            },
            GestureAction::Refresh => SimulatedInput::KeyPress {
                key: Key::KeyR,
                modifiers: match platform {
                    Platform::MacOs => Modifiers::COMMAND,
                    Platform::Linux | Platform::Windows => Modifiers::CONTROL,
                },
            },
            GestureAction::PlayPause => SimulatedInput::Media(MediaKey::PlayPause),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key) -> SimulatedInput {
        SimulatedInput::KeyPress {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn test_parse_and_as_str_agree_for_every_action() {
        for g in GestureAction::ALL {
            assert_eq!(GestureAction::parse(g.as_str()), Some(g));
        }
        for a in AnkiAction::ALL {
            assert_eq!(AnkiAction::parse(a.as_str()), Some(a));
        }
    }

    #[test]
    fn test_vocabulary_has_eleven_commands() {
        assert_eq!(RelayCommand::all().count(), 11);
    }

    #[test]
    fn test_anki_answers_map_to_digit_keys() {
        let p = Platform::MacOs;
        assert_eq!(resolve(RelayCommand::Anki(AnkiAction::One), p, 5), key(Key::Digit1));
        assert_eq!(resolve(RelayCommand::Anki(AnkiAction::Two), p, 5), key(Key::Digit2));
        assert_eq!(resolve(RelayCommand::Anki(AnkiAction::Three), p, 5), key(Key::Digit3));
        assert_eq!(resolve(RelayCommand::Anki(AnkiAction::Four), p, 5), key(Key::Digit4));
        assert_eq!(resolve(RelayCommand::Anki(AnkiAction::Space), p, 5), key(Key::Space));
    }

    #[test]
    fn test_scroll_gestures_use_configured_line_count() {
        // Act
        let down = resolve(RelayCommand::Gesture(GestureAction::ScrollDown), Platform::Linux, 3);
        let up = resolve(RelayCommand::Gesture(GestureAction::ScrollUp), Platform::Linux, 3);

        // Assert
        assert_eq!(
            down,
            SimulatedInput::Scroll { direction: ScrollDirection::Down, lines: 3 }
        );
        assert_eq!(up, SimulatedInput::Scroll { direction: ScrollDirection::Up, lines: 3 });
    }

    #[test]
    fn test_tap_presses_return() {
        let input = resolve(RelayCommand::Gesture(GestureAction::Tap), Platform::Windows, 5);
        assert_eq!(input, key(Key::Return));
    }

    #[test]
    fn test_back_uses_command_left_on_macos() {
        let input = resolve(RelayCommand::Gesture(GestureAction::Back), Platform::MacOs, 5);
        assert_eq!(
            input,
            SimulatedInput::KeyPress { key: Key::ArrowLeft, modifiers: Modifiers::COMMAND }
        );
    }

    #[test]
    fn test_back_uses_alt_left_elsewhere() {
        for p in [Platform::Linux, Platform::Windows] {
            let input = resolve(RelayCommand::Gesture(GestureAction::Back), p, 5);
            assert_eq!(
                input,
                SimulatedInput::KeyPress { key: Key::ArrowLeft, modifiers: Modifiers::ALT }
            );
        }
    }

    #[test]
    fn test_refresh_uses_platform_primary_modifier() {
        let mac = resolve(RelayCommand::Gesture(GestureAction::Refresh), Platform::MacOs, 5);
        let win = resolve(RelayCommand::Gesture(GestureAction::Refresh), Platform::Windows, 5);
        assert_eq!(mac, SimulatedInput::KeyPress { key: Key::KeyR, modifiers: Modifiers::COMMAND });
        assert_eq!(win, SimulatedInput::KeyPress { key: Key::KeyR, modifiers: Modifiers::CONTROL });
    }

    #[test]
    fn test_play_pause_is_media_key() {
        let input = resolve(RelayCommand::Gesture(GestureAction::PlayPause), Platform::MacOs, 5);
        assert_eq!(input, SimulatedInput::Media(MediaKey::PlayPause));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for command in RelayCommand::all() {
            let a = resolve(command, Platform::MacOs, DEFAULT_SCROLL_LINES);
            let b = resolve(command, Platform::MacOs, DEFAULT_SCROLL_LINES);
            assert_eq!(a, b, "{command:?} must resolve identically every time");
        }
    }
}
