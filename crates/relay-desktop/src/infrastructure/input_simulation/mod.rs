//! Platform-specific input simulation implementations.
//!
//! The native implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`; [`native_simulator`] hides the choice from
//! the binary.

use std::sync::Arc;

use tracing::{info, warn};

use crate::application::dispatch_action::{InputSimulator, SimulationError};

pub mod logging;
pub mod recording;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(all(target_os = "linux", feature = "xtest"))]
pub mod linux;

#[cfg(target_os = "macos")]
pub mod macos;

/// Builds the simulator for this platform.
///
/// With `dry_run` set, or where no native backend is compiled in, the
/// returned simulator only logs.
///
/// # Errors
///
/// Returns [`SimulationError`] if the native backend cannot be initialised
/// (for example no X display is reachable).
pub fn native_simulator(dry_run: bool) -> Result<Arc<dyn InputSimulator>, SimulationError> {
    if dry_run {
        info!("dry run: simulated input will be logged, not posted");
        return Ok(Arc::new(logging::LoggingSimulator::new()));
    }

    #[cfg(target_os = "macos")]
    {
        let sim = macos::MacosInputSimulator::new()?;
        if !sim.has_permission() {
            warn!("Accessibility permission not granted; commands will be dropped until it is");
        }
        return Ok(Arc::new(sim));
    }

    #[cfg(target_os = "windows")]
    {
        return Ok(Arc::new(windows::WindowsInputSimulator::new()));
    }

    #[cfg(all(target_os = "linux", feature = "xtest"))]
    {
        return Ok(Arc::new(linux::XTestInputSimulator::new()?));
    }

    #[allow(unreachable_code)]
    {
        warn!("no native input backend in this build; falling back to dry run");
        Ok(Arc::new(logging::LoggingSimulator::new()))
    }
}
