//! relay-remote library entry point.
//!
//! The companion side of WristRelay, usable without a watch: find a desktop
//! with a UDP probe, open the command session, and send records.
//!
//! - **`discovery`** – Broadcasts a `DiscoveryProbe` and waits for the first
//!   matching `DiscoveryReply`.
//! - **`sender`** – Holds the TCP session and writes length-prefixed records.

pub mod discovery;
pub mod sender;

use std::net::SocketAddr;

use relay_core::ProtocolError;
use thiserror::Error;

pub use discovery::{discover, DiscoveredDesktop};
pub use sender::RelaySender;

/// Errors that can occur on the companion side.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No desktop answered the probe in time.
    #[error("no desktop answered within {0} ms")]
    DiscoveryTimeout(u64),

    /// TCP connection to the desktop failed.
    #[error("failed to connect to desktop at {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded or written.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A socket operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
