//! Pure domain types: the action vocabulary and simulated-input descriptions.
//!
//! Nothing here performs I/O.  The desktop's infrastructure layer turns a
//! [`input::SimulatedInput`] into OS events.

pub mod actions;
pub mod input;
