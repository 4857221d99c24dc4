//! Recording input simulator for tests and integration harnesses.
//!
//! The real simulators post events into the desktop session, which a test
//! cannot observe and which would press keys on the machine running the
//! tests.  [`RecordingSimulator`] pushes every call into a `Mutex<Vec<_>>`
//! so assertions can check exactly what was produced and in what order.
//!
//! ```ignore
//! let sim = Arc::new(RecordingSimulator::new());
//! let use_case = DispatchActionUseCase::new(sim.clone(), 5);
//!
//! use_case.handle_message(&RelayMessage::new("gesture", "tap")).unwrap();
//!
//! assert_eq!(sim.inputs(), vec![SimulatedInput::KeyPress { key: Key::Return, modifiers: Modifiers::NONE }]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use relay_core::{Key, MediaKey, Modifiers, ScrollDirection, SimulatedInput};

use crate::application::dispatch_action::{InputSimulator, SimulationError};

/// A simulator that records calls instead of touching the OS.
pub struct RecordingSimulator {
    pub(crate) inputs: Mutex<Vec<SimulatedInput>>,
    pub(crate) permission: AtomicBool,
    /// When `true`, every input method returns `SimulationError::Platform`.
    pub should_fail: bool,
}

impl Default for RecordingSimulator {
    fn default() -> Self {
        Self {
            inputs: Mutex::new(Vec::new()),
            permission: AtomicBool::new(true),
            should_fail: false,
        }
    }
}

impl RecordingSimulator {
    /// Creates a simulator with permission granted and nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants or revokes the simulated input permission.
    pub fn set_permission(&self, granted: bool) {
        self.permission.store(granted, Ordering::SeqCst);
    }

    /// Returns a copy of every input recorded so far, oldest first.
    pub fn inputs(&self) -> Vec<SimulatedInput> {
        self.inputs
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn record(&self, input: SimulatedInput) -> Result<(), SimulationError> {
        if self.should_fail {
            return Err(SimulationError::Platform("simulated failure".into()));
        }
        self.inputs
            .lock()
            .map_err(|_| SimulationError::Platform("recording lock poisoned".into()))?
            .push(input);
        Ok(())
    }
}

impl InputSimulator for RecordingSimulator {
    fn has_permission(&self) -> bool {
        self.permission.load(Ordering::SeqCst)
    }

    fn key_press(&self, key: Key, modifiers: Modifiers) -> Result<(), SimulationError> {
        self.record(SimulatedInput::KeyPress { key, modifiers })
    }

    fn scroll(&self, direction: ScrollDirection, lines: u32) -> Result<(), SimulationError> {
        self.record(SimulatedInput::Scroll { direction, lines })
    }

    fn media_key(&self, key: MediaKey) -> Result<(), SimulationError> {
        self.record(SimulatedInput::Media(key))
    }
}
