//! UDP discovery responder.
//!
//! The desktop binds a UDP socket on the discovery port (default 47800) and
//! answers `DiscoveryProbe` datagrams broadcast by companions.  For each
//! probe for the `wristrelay` service it:
//!
//! 1. Sends a `DiscoveryReply` (host name + session port) back to the
//!    probe's source address.
//! 2. Records the probe's device name in the [`PeerDirectory`].
//! 3. Emits a [`DiscoveryEvent`] for logging.
//!
//! While `advertising` is cleared (listening stopped) probes are read and
//! discarded without a reply, so the desktop disappears from companions'
//! device lists.
//!
//! The responder runs on a dedicated thread with a 500 ms read timeout; on
//! every timeout it re-checks the `running` flag and exits once it clears.

use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use relay_core::protocol::discovery::{
    decode_datagram, encode_datagram, DiscoveryProbe, DiscoveryReply, MAX_DATAGRAM_LEN,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::peers::PeerDirectory;

/// Error type for discovery responder operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The bound socket could not be given its read timeout.
    #[error("failed to configure discovery socket: {0}")]
    Configure(#[source] std::io::Error),
    /// The responder thread could not be started.
    #[error("failed to spawn discovery thread: {0}")]
    Spawn(std::io::Error),
}

/// Where to listen and what to advertise.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub bind_address: IpAddr,
    pub discovery_port: u16,
    /// Name shown in the companion's device list.
    pub host_name: String,
    /// TCP port the session listener is bound to.
    pub session_port: u16,
}

/// A companion probed for this desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryEvent {
    pub device_name: String,
    pub peer: SocketAddr,
}

/// A running responder.
pub struct DiscoveryResponder {
    /// The bound socket address; the port is real even when 0 was requested.
    pub local_addr: SocketAddr,
    pub events: mpsc::Receiver<DiscoveryEvent>,
    thread: std::thread::JoinHandle<()>,
}

impl DiscoveryResponder {
    /// Returns `true` once the responder thread has exited.
    pub fn is_stopped(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Binds the discovery socket and spawns the responder thread.
///
/// # Errors
///
/// Returns [`DiscoveryError::BindFailed`] if the socket cannot be bound and
/// [`DiscoveryError::Configure`] if its read timeout cannot be set.
pub fn start_discovery_responder(
    config: DiscoveryConfig,
    peers: PeerDirectory,
    running: Arc<AtomicBool>,
    advertising: Arc<AtomicBool>,
) -> Result<DiscoveryResponder, DiscoveryError> {
    let addr = SocketAddr::new(config.bind_address, config.discovery_port);
    let socket =
        UdpSocket::bind(addr).map_err(|source| DiscoveryError::BindFailed { addr, source })?;
    // Without the timeout `recv_from` never returns and `running` is never re-read.
    socket
        .set_read_timeout(Some(Duration::from_millis(500)))
        .map_err(DiscoveryError::Configure)?;
    let local_addr = socket
        .local_addr()
        .map_err(|source| DiscoveryError::BindFailed { addr, source })?;

    let (tx, rx) = mpsc::channel(64);
    let reply = DiscoveryReply::new(config.host_name, config.session_port);

    let thread = std::thread::Builder::new()
        .name("relay-discovery".to_string())
        .spawn(move || discovery_loop(socket, reply, peers, tx, running, advertising))
        .map_err(DiscoveryError::Spawn)?;

    info!("discovery responder listening on UDP {local_addr}");
    Ok(DiscoveryResponder {
        local_addr,
        events: rx,
        thread,
    })
}

/// The receive loop executed on the discovery thread.
fn discovery_loop(
    socket: UdpSocket,
    reply: DiscoveryReply,
    peers: PeerDirectory,
    tx: mpsc::Sender<DiscoveryEvent>,
    running: Arc<AtomicBool>,
    advertising: Arc<AtomicBool>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];

    while running.load(Ordering::Relaxed) {
        let (len, src) = match socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(e) if is_timeout_error(&e) => continue,
            Err(e) => {
                error!("discovery recv error: {e}");
                continue;
            }
        };

        let probe: DiscoveryProbe = match decode_datagram(&buf[..len]) {
            Ok(probe) => probe,
            Err(e) => {
                debug!("failed to decode discovery datagram from {src}: {e}");
                continue;
            }
        };
        if !probe.is_for_service() {
            debug!("ignoring probe for service {:?} from {src}", probe.service);
            continue;
        }
        if !advertising.load(Ordering::Relaxed) {
            debug!("not advertising; ignoring probe from {src}");
            continue;
        }

        debug!("probe from {src}: device_name={}", probe.device_name);
        send_reply(&socket, &reply, src);
        peers.record(src.ip(), probe.device_name.clone());

        let event = DiscoveryEvent {
            device_name: probe.device_name,
            peer: src,
        };
        if let Err(mpsc::error::TrySendError::Full(event)) = tx.try_send(event) {
            debug!("discovery event channel full; dropping {event:?}");
        }
    }

    info!("discovery responder stopped");
}

fn send_reply(socket: &UdpSocket, reply: &DiscoveryReply, dest: SocketAddr) {
    match encode_datagram(reply) {
        Ok(bytes) => {
            if let Err(e) = socket.send_to(&bytes, dest) {
                warn!("failed to send discovery reply to {dest}: {e}");
            }
        }
        Err(e) => error!("failed to encode discovery reply: {e}"),
    }
}

/// Returns `true` for OS timeout / would-block errors that should be retried.
pub(crate) fn is_timeout_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
