//! Network infrastructure for the desktop daemon.
//!
//! # Sub-modules
//!
//! - **`discovery`** – Answers UDP discovery probes broadcast by companions so
//!   they can find this machine without typing an address.
//!
//! - **`peers`** – The shared `PeerDirectory` mapping a companion's IP to the
//!   device name it announced in its probe.
//!
//! - **`session`** – The TCP command session: one active connection at a
//!   time, newest wins, length-prefixed JSON records in arrival order.

pub mod discovery;
pub mod peers;
pub mod session;
