//! Application layer use cases for the desktop daemon.
//!
//! - **`dispatch_action`** – Interprets a received command record and invokes
//!   exactly one method on an injected [`dispatch_action::InputSimulator`].
//!
//! - **`session_state`** – The observable state of the session (listening,
//!   connected device, last action) owned by the dispatch loop.

pub mod dispatch_action;
pub mod session_state;
