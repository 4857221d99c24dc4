//! The command record exchanged between the companion and the desktop.
//!
//! # JSON shape
//!
//! Every command is a JSON object with exactly two meaningful fields:
//!
//! ```json
//! {"type":"gesture","action":"scroll_down"}
//! {"type":"anki_action","action":"anki_space"}
//! ```
//!
//! Both fields are kept as plain strings on the wire type.  The sender may
//! be a newer or older companion build, so an unrecognised `type` or `action`
//! must decode successfully and then be ignored by the dispatcher rather
//! than rejected by the decoder.  [`RelayMessage::command`] performs the typed
//! interpretation.

use serde::{Deserialize, Serialize};

use crate::domain::actions::{AnkiAction, GestureAction, RelayCommand};

/// Discriminator value for gesture commands.
pub const KIND_GESTURE: &str = "gesture";
/// Discriminator value for flashcard-review commands.
pub const KIND_ANKI_ACTION: &str = "anki_action";

/// A single relayed command as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Command category, `"gesture"` or `"anki_action"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Action identifier from the closed vocabulary, e.g. `"scroll_down"`.
    pub action: String,
}

/// The two recognised command categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Gesture,
    AnkiAction,
}

impl MessageKind {
    /// Parses a wire discriminator, returning `None` for anything unrecognised.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            KIND_GESTURE => Some(Self::Gesture),
            KIND_ANKI_ACTION => Some(Self::AnkiAction),
            _ => None,
        }
    }

    /// Returns the wire discriminator string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gesture => KIND_GESTURE,
            Self::AnkiAction => KIND_ANKI_ACTION,
        }
    }
}

impl RelayMessage {
    /// Creates a record from raw strings.
    pub fn new(kind: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            action: action.into(),
        }
    }

    /// Builds a gesture record.
    pub fn gesture(action: GestureAction) -> Self {
        Self::new(KIND_GESTURE, action.as_str())
    }

    /// Builds a flashcard-review record.
    pub fn anki(action: AnkiAction) -> Self {
        Self::new(KIND_ANKI_ACTION, action.as_str())
    }

    /// Returns the parsed category, or `None` if `type` is unrecognised.
    pub fn message_kind(&self) -> Option<MessageKind> {
        MessageKind::parse(&self.kind)
    }

    /// Interprets the record as a typed command.
    ///
    /// Returns `None` when either the category or the action is outside the
    /// vocabulary, or when the action belongs to the other category
    /// (e.g. `{"type":"gesture","action":"anki_1"}`).
    pub fn command(&self) -> Option<RelayCommand> {
        match self.message_kind()? {
            MessageKind::Gesture => GestureAction::parse(&self.action).map(RelayCommand::Gesture),
            MessageKind::AnkiAction => AnkiAction::parse(&self.action).map(RelayCommand::Anki),
        }
    }
}

impl From<RelayCommand> for RelayMessage {
    fn from(command: RelayCommand) -> Self {
        match command {
            RelayCommand::Gesture(g) => Self::gesture(g),
            RelayCommand::Anki(a) => Self::anki(a),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
