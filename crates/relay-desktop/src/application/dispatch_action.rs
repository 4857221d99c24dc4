//! DispatchActionUseCase: turns a received command record into simulated input.
//!
//! This use case sits at the application layer and delegates to an
//! [`InputSimulator`] trait object for OS-level event injection.  The
//! platform-specific implementations are in the infrastructure layer.
//!
//! Unrecognised records and missing input permission are not errors.  They
//! come back as a [`DispatchOutcome`] and are logged at debug level only;
//! undecodable payloads never get this far.

use std::sync::Arc;

use relay_core::{
    resolve, Key, MediaKey, Modifiers, Platform, RelayMessage, ScrollDirection, SimulatedInput,
};
use thiserror::Error;
use tracing::debug;

/// Error type for input simulation operations.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("no native keycode for {0:?} on this keyboard layout")]
    UnmappedKey(Key),
}

/// Platform-agnostic input simulation trait.
///
/// Each supported OS provides an implementation in the infrastructure layer.
/// Every method posts a complete press/release pair; callers never see a
/// half-pressed key.
#[cfg_attr(test, mockall::automock)]
pub trait InputSimulator: Send + Sync {
    /// Returns `true` if the process may post synthetic input.
    ///
    /// On macOS this is the Accessibility trust check; other platforms
    /// always return `true`.
    fn has_permission(&self) -> bool;

    /// Presses and releases `key` while holding `modifiers`.
    fn key_press(&self, key: Key, modifiers: Modifiers) -> Result<(), SimulationError>;

    /// Scrolls the wheel by `lines` line units.
    fn scroll(&self, direction: ScrollDirection, lines: u32) -> Result<(), SimulationError>;

    /// Presses and releases a media key.
    fn media_key(&self, key: MediaKey) -> Result<(), SimulationError>;
}

/// What happened to one command record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The record resolved to `input` and the simulator was invoked once.
    Dispatched(SimulatedInput),
    /// The `type` or `action` is outside the vocabulary; nothing happened.
    Ignored,
    /// Input permission is missing; nothing happened.
    PermissionDenied,
}

/// The Dispatch Action use case.
pub struct DispatchActionUseCase {
    simulator: Arc<dyn InputSimulator>,
    platform: Platform,
    scroll_lines: u32,
}

impl DispatchActionUseCase {
    /// Creates a use case for the current platform.
    pub fn new(simulator: Arc<dyn InputSimulator>, scroll_lines: u32) -> Self {
        Self::for_platform(simulator, Platform::current(), scroll_lines)
    }

    /// Creates a use case that resolves shortcuts for `platform`.
    pub fn for_platform(
        simulator: Arc<dyn InputSimulator>,
        platform: Platform,
        scroll_lines: u32,
    ) -> Self {
        Self {
            simulator,
            platform,
            scroll_lines,
        }
    }

    /// Handles one decoded record.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] only if the OS event injection itself fails.
    pub fn handle_message(&self, msg: &RelayMessage) -> Result<DispatchOutcome, SimulationError> {
        let Some(command) = msg.command() else {
            debug!("ignoring unrecognised command type={:?} action={:?}", msg.kind, msg.action);
            return Ok(DispatchOutcome::Ignored);
        };

        if !self.simulator.has_permission() {
            debug!("input permission missing; dropping {command:?}");
            return Ok(DispatchOutcome::PermissionDenied);
        }

        let input = resolve(command, self.platform, self.scroll_lines);
        self.execute(input)?;
        debug!("dispatched {command:?} as {input}");
        Ok(DispatchOutcome::Dispatched(input))
    }

    /// Forwards one resolved input to the simulator.
    fn execute(&self, input: SimulatedInput) -> Result<(), SimulationError> {
        match input {
            SimulatedInput::KeyPress { key, modifiers } => self.simulator.key_press(key, modifiers),
            SimulatedInput::Scroll { direction, lines } => self.simulator.scroll(direction, lines),
            SimulatedInput::Media(key) => self.simulator.media_key(key),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn use_case(mock: MockInputSimulator, platform: Platform) -> DispatchActionUseCase {
        DispatchActionUseCase::for_platform(Arc::new(mock), platform, 5)
    }

    #[test]
    fn test_anki_answer_presses_digit_once() {
        // Arrange
        let mut mock = MockInputSimulator::new();
        mock.expect_has_permission().return_const(true);
        mock.expect_key_press()
            .with(eq(Key::Digit3), eq(Modifiers::NONE))
            .times(1)
            .returning(|_, _| Ok(()));
        let uc = use_case(mock, Platform::MacOs);

        // Act
        let outcome = uc.handle_message(&RelayMessage::new("anki_action", "anki_3")).unwrap();

        // Assert
        assert_eq!(
            outcome,
            DispatchOutcome::Dispatched(SimulatedInput::KeyPress {
                key: Key::Digit3,
                modifiers: Modifiers::NONE
            })
        );
    }

    #[test]
    fn test_scroll_down_scrolls_configured_lines() {
        let mut mock = MockInputSimulator::new();
        mock.expect_has_permission().return_const(true);
        mock.expect_scroll()
            .with(eq(ScrollDirection::Down), eq(5))
            .times(1)
            .returning(|_, _| Ok(()));
        let uc = use_case(mock, Platform::Linux);

        uc.handle_message(&RelayMessage::new("gesture", "scroll_down")).unwrap();
    }

    #[test]
    fn test_back_on_macos_presses_command_left() {
        let mut mock = MockInputSimulator::new();
        mock.expect_has_permission().return_const(true);
        mock.expect_key_press()
            .with(eq(Key::ArrowLeft), eq(Modifiers::COMMAND))
            .times(1)
            .returning(|_, _| Ok(()));
        let uc = use_case(mock, Platform::MacOs);

        uc.handle_message(&RelayMessage::new("gesture", "back")).unwrap();
    }

    #[test]
    fn test_play_pause_posts_media_key() {
        let mut mock = MockInputSimulator::new();
        mock.expect_has_permission().return_const(true);
        mock.expect_media_key()
            .with(eq(MediaKey::PlayPause))
            .times(1)
            .returning(|_| Ok(()));
        let uc = use_case(mock, Platform::Windows);

        uc.handle_message(&RelayMessage::new("gesture", "play_pause")).unwrap();
    }

    #[test]
    fn test_unknown_action_makes_no_simulator_calls() {
        // Arrange – no expectations: any call on the mock panics
        let mock = MockInputSimulator::new();
        let uc = use_case(mock, Platform::MacOs);

        // Act
        let outcome = uc.handle_message(&RelayMessage::new("gesture", "wave")).unwrap();

        // Assert
        assert_eq!(outcome, DispatchOutcome::Ignored);
    }

    #[test]
    fn test_unknown_type_makes_no_simulator_calls() {
        let mock = MockInputSimulator::new();
        let uc = use_case(mock, Platform::MacOs);

        let outcome = uc.handle_message(&RelayMessage::new("keyboard", "anki_1")).unwrap();

        assert_eq!(outcome, DispatchOutcome::Ignored);
    }

    #[test]
    fn test_missing_permission_is_a_silent_no_op() {
        // Arrange – permission is checked, but no input method may be called
        let mut mock = MockInputSimulator::new();
        mock.expect_has_permission().times(1).return_const(false);
        let uc = use_case(mock, Platform::MacOs);

        // Act
        let outcome = uc.handle_message(&RelayMessage::new("gesture", "tap")).unwrap();

        // Assert
        assert_eq!(outcome, DispatchOutcome::PermissionDenied);
    }

    #[test]
    fn test_simulator_failure_is_propagated() {
        let mut mock = MockInputSimulator::new();
        mock.expect_has_permission().return_const(true);
        mock.expect_key_press()
            .returning(|_, _| Err(SimulationError::Platform("injected failure".to_string())));
        let uc = use_case(mock, Platform::Linux);

        let result = uc.handle_message(&RelayMessage::new("gesture", "tap"));

        assert!(matches!(result, Err(SimulationError::Platform(_))));
    }

    #[test]
    fn test_every_simulation_error_is_produced_by_a_backend() {
        // No wildcard arm: every variant listed here is returned by a backend.
        let errors = [
            SimulationError::Platform("SendInput injected 0 of 4 events".to_string()),
            SimulationError::UnmappedKey(Key::KeyR),
        ];

        for e in &errors {
            let described = match e {
                SimulationError::Platform(msg) => msg.clone(),
                SimulationError::UnmappedKey(key) => format!("{key:?}"),
            };
            assert!(e.to_string().contains(&described), "{e}");
        }
    }
}
