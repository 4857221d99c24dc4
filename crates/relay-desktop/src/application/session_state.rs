//! Observable session state: listening, connection, and last action.
//!
//! The dispatch loop owns the only [`SessionState`] and mutates it as
//! network events arrive, so no locking is needed.  Anything that wants to
//! show the state (logs, a future tray icon) takes a [`StatusSnapshot`].

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Mutable session state owned by the dispatch loop.
#[derive(Debug, Clone)]
pub struct SessionState {
    listening: bool,
    connected: bool,
    device_name: Option<String>,
    last_action: Option<String>,
    last_action_at: Option<SystemTime>,
}

/// Serializable point-in-time copy of [`SessionState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub listening: bool,
    pub connected: bool,
    pub device_name: Option<String>,
    /// Human-readable form of the last action, e.g. `"scroll down"`.
    pub last_action: Option<String>,
    /// Milliseconds since the Unix epoch at which the last action arrived.
    pub last_action_at_ms: Option<u64>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Creates the initial state: listening, nobody connected.
    pub fn new() -> Self {
        Self {
            listening: true,
            connected: false,
            device_name: None,
            last_action: None,
            last_action_at: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    /// A companion connected.
    pub fn on_connected(&mut self, device_name: impl Into<String>) {
        self.connected = true;
        self.device_name = Some(device_name.into());
    }

    /// The companion went away.
    pub fn on_disconnected(&mut self) {
        self.connected = false;
        self.device_name = None;
    }

    /// Records an action as received, whether or not it was recognised.
    pub fn record_action(&mut self, action: &str, at: SystemTime) {
        self.last_action = Some(action.to_string());
        self.last_action_at = Some(at);
    }

    /// Enables or disables listening.  Disabling also drops the connection.
    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
        if !listening {
            self.on_disconnected();
        }
    }

    /// Returns a serializable copy of the current state.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            listening: self.listening,
            connected: self.connected,
            device_name: self.device_name.clone(),
            last_action: self.last_action.as_deref().map(display_action),
            last_action_at_ms: self.last_action_at.and_then(|t| {
                t.duration_since(UNIX_EPOCH)
                    .ok()
                    .map(|d| d.as_millis() as u64)
            }),
        }
    }
}

/// Renders a wire action identifier for people: `"scroll_down"` → `"scroll down"`.
pub fn display_action(action: &str) -> String {
    action.replace('_', " ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
