//! Dry-run simulator that only logs what it would have posted.
//!
//! Used with `--dry-run`, and on Linux builds without the `xtest` feature.

use relay_core::{Key, MediaKey, Modifiers, ScrollDirection, SimulatedInput};
use tracing::info;

use crate::application::dispatch_action::{InputSimulator, SimulationError};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSimulator;

impl LoggingSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl InputSimulator for LoggingSimulator {
    fn has_permission(&self) -> bool {
        true
    }

    fn key_press(&self, key: Key, modifiers: Modifiers) -> Result<(), SimulationError> {
        info!(target: "relay::dry_run", "{}", SimulatedInput::KeyPress { key, modifiers });
        Ok(())
    }

    fn scroll(&self, direction: ScrollDirection, lines: u32) -> Result<(), SimulationError> {
        info!(target: "relay::dry_run", "{}", SimulatedInput::Scroll { direction, lines });
        Ok(())
    }

    fn media_key(&self, key: MediaKey) -> Result<(), SimulationError> {
        info!(target: "relay::dry_run", "{}", SimulatedInput::Media(key));
        Ok(())
    }
}
