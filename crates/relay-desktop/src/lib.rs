//! relay-desktop library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does relay-desktop do?
//!
//! 1. Answers UDP discovery probes so a companion can find this machine.
//! 2. Accepts one TCP command session at a time.
//! 3. Reads length-prefixed JSON records such as
//!    `{"type":"gesture","action":"tap"}` in arrival order.
//! 4. Hands every record to a single dispatch loop, which resolves it to one
//!    simulated key press, scroll, or media key and posts it through the
//!    platform input API.

/// Application layer: use cases for the desktop.
pub mod application;

/// The dispatch loop that owns session state and drives the simulator.
pub mod daemon;

/// Infrastructure layer: OS adapters, network, and configuration storage.
pub mod infrastructure;
