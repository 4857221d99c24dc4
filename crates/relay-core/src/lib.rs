//! # relay-core
//!
//! Shared library for WristRelay containing the wire protocol, the fixed
//! action vocabulary, and the per-platform key translation tables.
//!
//! This crate is used by both the desktop daemon and the companion CLI.
//! It opens no sockets and calls no OS input APIs.
//!
//! # Architecture overview
//!
//! A companion device (a watch, or the `relay-remote` CLI standing in for
//! one) sends small JSON records such as
//! `{"type":"gesture","action":"scroll_down"}` to a desktop.  The desktop turns
//! each recognised record into exactly one simulated keyboard, scroll, or media
//! key event.
//!
//! - **`protocol`** – The JSON record, the length-prefixed frame codec used on
//!   the session stream, and the UDP discovery datagrams.
//!
//! - **`domain`** – The typed action vocabulary and the platform-neutral
//!   description of a simulated input (`SimulatedInput`).
//!
//! - **`keymap`** – Translation tables from platform-neutral keys to macOS
//!   `CGKeyCode`s, X11 KeySyms, and Windows virtual-key codes.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::actions::{resolve, AnkiAction, GestureAction, RelayCommand};
pub use domain::input::{Key, MediaKey, Modifiers, Platform, ScrollDirection, SimulatedInput};
pub use protocol::codec::{decode_payload, encode_frame, read_frame, ProtocolError};
pub use protocol::messages::{MessageKind, RelayMessage};
