//! The dispatch loop: the single owner of session state and input simulation.
//!
//! Network tasks never touch the simulator.  They push [`SessionEvent`]s
//! into one channel and this loop drains it, so commands are executed one at
//! a time in the order the companion sent them.
//!
//! ```text
//! discovery thread ──(PeerDirectory)──┐
//! accept loop ── connection task ── mpsc<SessionEvent> ──▶ DispatchLoop
//!                                                            ├─ SessionState
//!                                                            ├─ DispatchActionUseCase
//!                                                            └─ watch<StatusSnapshot>
//! ```

use std::time::SystemTime;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::application::dispatch_action::{DispatchActionUseCase, DispatchOutcome};
use crate::application::session_state::{display_action, SessionState, StatusSnapshot};
use crate::infrastructure::network::session::SessionEvent;

pub struct DispatchLoop {
    use_case: DispatchActionUseCase,
    state: SessionState,
    status: watch::Sender<StatusSnapshot>,
}

impl DispatchLoop {
    /// Creates the loop and a receiver that always holds the latest status.
    pub fn new(use_case: DispatchActionUseCase) -> (Self, watch::Receiver<StatusSnapshot>) {
        let state = SessionState::new();
        let (status, status_rx) = watch::channel(state.snapshot());
        (
            Self {
                use_case,
                state,
                status,
            },
            status_rx,
        )
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Applies one event.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected {
                peer, device_name, ..
            } => {
                info!("connected to {device_name} ({peer})");
                self.state.on_connected(device_name);
            }
            SessionEvent::Disconnected { session_id } => {
                info!("companion disconnected (session {session_id})");
                self.state.on_disconnected();
            }
            SessionEvent::ListeningChanged(listening) => {
                self.state.set_listening(listening);
            }
            SessionEvent::Message(msg) => {
                self.state.record_action(&msg.action, SystemTime::now());
                match self.use_case.handle_message(&msg) {
                    Ok(DispatchOutcome::Dispatched(input)) => {
                        info!("{} → {input}", display_action(&msg.action));
                    }
                    Ok(DispatchOutcome::Ignored) | Ok(DispatchOutcome::PermissionDenied) => {}
                    Err(e) => error!("input simulation failed for {:?}: {e}", msg.action),
                }
            }
        }
        self.status.send_replace(self.state.snapshot());
    }

    /// Drains `events` until every sender is gone, then returns the final state.
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) -> SessionState {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        debug!("event channel closed; dispatch loop exiting");
        self.state
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
