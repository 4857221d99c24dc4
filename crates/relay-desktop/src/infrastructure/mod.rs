//! Infrastructure layer for the desktop daemon.
//!
//! **Dependency rule**: this layer may depend on `application` and `relay_core`,
//! but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`input_simulation`** – OS-specific implementations of `InputSimulator`,
//!   plus a recording simulator for tests and a logging dry-run backend.
//!
//! - **`network`** – The UDP discovery responder and the single-connection
//!   TCP session listener.
//!
//! - **`storage`** – TOML configuration file persistence.

pub mod input_simulation;
pub mod network;
pub mod storage;
