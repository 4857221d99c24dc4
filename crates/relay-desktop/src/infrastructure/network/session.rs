//! The TCP command session.
//!
//! The desktop accepts at most one companion at a time.  A new inbound
//! connection replaces the active one: the old connection is closed and its
//! `Disconnected` event is delivered before the newcomer's `Connected`.
//!
//! Per connection, frames are read in arrival order with
//! [`relay_core::read_frame`].  A payload that is not a valid command record
//! is dropped and the connection stays up; a framing error (oversized or
//! truncated frame) closes it, since the stream cannot be resynchronised.
//!
//! All events flow over one `mpsc` channel to the dispatch loop, which is the
//! only place input is simulated or state is mutated.
//!
//! # Listening control
//!
//! [`SessionHandle::stop_listening`] closes the active connection, clears the
//! shared `advertising` flag (the discovery responder stops answering) and
//! turns away new connections.  [`SessionHandle::start_listening`] undoes
//! that.  Both are idempotent.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use relay_core::{decode_payload, read_frame, RelayMessage};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::peers::PeerDirectory;

/// Errors that can occur in the session listener.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The TCP listener could not be bound.
    #[error("failed to bind session listener on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// The accept loop has exited; the handle is no longer usable.
    #[error("session listener is not running")]
    ListenerGone,
}

/// Events delivered to the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A companion connected.
    Connected {
        session_id: Uuid,
        peer: SocketAddr,
        device_name: String,
    },
    /// A decoded command record, in arrival order.
    Message(RelayMessage),
    /// The connection identified by `session_id` ended.
    Disconnected { session_id: Uuid },
    /// Listening was started or stopped.
    ListeningChanged(bool),
}

#[derive(Debug)]
enum Control {
    Start,
    Stop,
    Shutdown,
}

/// A bound, not yet running, session listener.
pub struct SessionListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

/// Cloneable control handle for a running listener.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    control: mpsc::Sender<Control>,
    advertising: Arc<AtomicBool>,
}

struct ActiveConnection {
    id: Uuid,
    close: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ActiveConnection {
    /// Asks the connection task to stop and waits until it has reported
    /// `Disconnected`.
    async fn close(self) {
        let _ = self.close.send(());
        if let Err(e) = self.task.await {
            warn!("session {} task ended abnormally: {e}", self.id);
        }
    }
}

impl SessionListener {
    /// Binds the TCP listener.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::BindFailed`] if the address is unavailable.
    pub async fn bind(addr: SocketAddr) -> Result<Self, SessionError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| SessionError::BindFailed { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| SessionError::BindFailed { addr, source })?;
        info!("session listener bound on TCP {local_addr}");
        Ok(Self {
            listener,
            local_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns the accept loop.
    ///
    /// `advertising` is shared with the discovery responder; its current value
    /// decides whether the listener starts out accepting companions.
    pub fn start(
        self,
        peers: PeerDirectory,
        advertising: Arc<AtomicBool>,
    ) -> (SessionHandle, mpsc::Receiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (control_tx, control_rx) = mpsc::channel(8);

        tokio::spawn(accept_loop(
            self.listener,
            peers,
            Arc::clone(&advertising),
            event_tx,
            control_rx,
        ));

        let handle = SessionHandle {
            control: control_tx,
            advertising,
        };
        (handle, event_rx)
    }
}

impl SessionHandle {
    /// Re-enables advertising and accepting companions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ListenerGone`] after shutdown.
    pub async fn start_listening(&self) -> Result<(), SessionError> {
        self.send(Control::Start).await
    }

    /// Closes the active connection and stops advertising.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ListenerGone`] after shutdown.
    pub async fn stop_listening(&self) -> Result<(), SessionError> {
        self.send(Control::Stop).await
    }

    /// Closes the active connection and ends the accept loop.
    pub async fn shutdown(&self) {
        let _ = self.send(Control::Shutdown).await;
    }

    pub fn is_listening(&self) -> bool {
        self.advertising.load(Ordering::Relaxed)
    }

    async fn send(&self, cmd: Control) -> Result<(), SessionError> {
        self.control
            .send(cmd)
            .await
            .map_err(|_| SessionError::ListenerGone)
    }
}

async fn accept_loop(
    listener: TcpListener,
    peers: PeerDirectory,
    advertising: Arc<AtomicBool>,
    events: mpsc::Sender<SessionEvent>,
    mut control: mpsc::Receiver<Control>,
) {
    let mut active: Option<ActiveConnection> = None;
    let mut listening = advertising.load(Ordering::Relaxed);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("session accept error: {e}");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        continue;
                    }
                };
                if !listening {
                    debug!("not listening; refusing connection from {peer}");
                    continue;
                }
                if let Some(old) = active.take() {
                    info!("new companion at {peer} replaces session {}", old.id);
                    old.close().await;
                }
                active = Some(spawn_connection(stream, peer, &peers, events.clone()));
            }
            cmd = control.recv() => match cmd {
                Some(Control::Start) => {
                    if !listening {
                        listening = true;
                        advertising.store(true, Ordering::Relaxed);
                        info!("listening started");
                        let _ = events.send(SessionEvent::ListeningChanged(true)).await;
                    }
                }
                Some(Control::Stop) => {
                    if listening {
                        listening = false;
                        advertising.store(false, Ordering::Relaxed);
                        if let Some(old) = active.take() {
                            old.close().await;
                        }
                        info!("listening stopped");
                        let _ = events.send(SessionEvent::ListeningChanged(false)).await;
                    }
                }
                Some(Control::Shutdown) | None => {
                    if let Some(old) = active.take() {
                        old.close().await;
                    }
                    break;
                }
            }
        }
    }

    info!("session listener stopped");
}

fn spawn_connection(
    stream: TcpStream,
    peer: SocketAddr,
    peers: &PeerDirectory,
    events: mpsc::Sender<SessionEvent>,
) -> ActiveConnection {
    let id = Uuid::new_v4();
    let device_name = peers.display_name(peer);
    let (close_tx, close_rx) = oneshot::channel();
    let task = tokio::spawn(connection_loop(stream, id, peer, device_name, events, close_rx));
    ActiveConnection {
        id,
        close: close_tx,
        task,
    }
}

/// Reads frames from one companion until it leaves, errs, or is closed.
async fn connection_loop(
    mut stream: TcpStream,
    id: Uuid,
    peer: SocketAddr,
    device_name: String,
    events: mpsc::Sender<SessionEvent>,
    mut close: oneshot::Receiver<()>,
) {
    info!("session {id}: {device_name} connected from {peer}");
    let connected = SessionEvent::Connected {
        session_id: id,
        peer,
        device_name,
    };
    if events.send(connected).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            _ = &mut close => {
                debug!("session {id}: closed locally");
                break;
            }
            frame = read_frame(&mut stream) => match frame {
                Ok(Some(payload)) => match decode_payload(&payload) {
                    Ok(msg) => {
                        if events.send(SessionEvent::Message(msg)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!("session {id}: dropping record from {peer}: {e}"),
                },
                Ok(None) => {
                    info!("session {id}: {peer} closed the connection");
                    break;
                }
                Err(e) => {
                    warn!("session {id}: closing after framing error: {e}");
                    break;
                }
            }
        }
    }

    let _ = events.send(SessionEvent::Disconnected { session_id: id }).await;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::encode_frame;
    use tokio::io::AsyncWriteExt;
    use tokio::time::timeout;

    async fn started(listening: bool) -> (SessionHandle, mpsc::Receiver<SessionEvent>, SocketAddr) {
        let listener = SessionListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = listener.local_addr();
        let advertising = Arc::new(AtomicBool::new(listening));
        let (handle, rx) = listener.start(PeerDirectory::new(), advertising);
        (handle, rx, addr)
    }

    async fn next(rx: &mut mpsc::Receiver<SessionEvent>) -> SessionEvent {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("event within 2s")
            .expect("channel open")
    }

    #[tokio::test]
    async fn test_connection_emits_connected_then_messages_in_order() {
        // Arrange
        let (_handle, mut rx, addr) = started(true).await;
        let mut client = TcpStream::connect(addr).await.unwrap();

        // Act
        for action in ["anki_1", "anki_space"] {
            let frame = encode_frame(&RelayMessage::new("anki_action", action)).unwrap();
            client.write_all(&frame).await.unwrap();
        }

        // Assert
        let SessionEvent::Connected { device_name, .. } = next(&mut rx).await else {
            panic!("expected Connected first");
        };
        assert_eq!(device_name, "127.0.0.1");
        assert_eq!(
            next(&mut rx).await,
            SessionEvent::Message(RelayMessage::new("anki_action", "anki_1"))
        );
        assert_eq!(
            next(&mut rx).await,
            SessionEvent::Message(RelayMessage::new("anki_action", "anki_space"))
        );
    }

    #[tokio::test]
    async fn test_malformed_record_is_dropped_and_connection_stays_up() {
        let (_handle, mut rx, addr) = started(true).await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        let _ = next(&mut rx).await; // Connected

        let junk = b"{not json";
        client.write_all(&(junk.len() as u32).to_be_bytes()).await.unwrap();
        client.write_all(junk).await.unwrap();
        let frame = encode_frame(&RelayMessage::new("gesture", "tap")).unwrap();
        client.write_all(&frame).await.unwrap();

        assert_eq!(
            next(&mut rx).await,
            SessionEvent::Message(RelayMessage::new("gesture", "tap"))
        );
    }

    #[tokio::test]
    async fn test_oversized_frame_closes_connection() {
        let (_handle, mut rx, addr) = started(true).await;
        let mut client = TcpStream::connect(addr).await.unwrap();
        let SessionEvent::Connected { session_id, .. } = next(&mut rx).await else {
            panic!("expected Connected");
        };

        client.write_all(&100_000u32.to_be_bytes()).await.unwrap();

        assert_eq!(next(&mut rx).await, SessionEvent::Disconnected { session_id });
    }

    #[tokio::test]
    async fn test_newest_connection_wins() {
        // Arrange
        let (_handle, mut rx, addr) = started(true).await;
        let _first = TcpStream::connect(addr).await.unwrap();
        let SessionEvent::Connected { session_id: first_id, .. } = next(&mut rx).await else {
            panic!("expected first Connected");
        };

        // Act
        let _second = TcpStream::connect(addr).await.unwrap();

        // Assert – the old session is reported gone before the new one arrives
        assert_eq!(next(&mut rx).await, SessionEvent::Disconnected { session_id: first_id });
        let SessionEvent::Connected { session_id: second_id, .. } = next(&mut rx).await else {
            panic!("expected second Connected");
        };
        assert_ne!(first_id, second_id);
    }

    #[tokio::test]
    async fn test_stop_listening_closes_session_and_is_idempotent() {
        // Arrange
        let (handle, mut rx, addr) = started(true).await;
        let _client = TcpStream::connect(addr).await.unwrap();
        let SessionEvent::Connected { session_id, .. } = next(&mut rx).await else {
            panic!("expected Connected");
        };

        // Act
        handle.stop_listening().await.unwrap();
        handle.stop_listening().await.unwrap();
        handle.start_listening().await.unwrap();

        // Assert
        assert_eq!(next(&mut rx).await, SessionEvent::Disconnected { session_id });
        assert_eq!(next(&mut rx).await, SessionEvent::ListeningChanged(false));
        assert_eq!(next(&mut rx).await, SessionEvent::ListeningChanged(true));
        assert!(handle.is_listening());
    }

    #[tokio::test]
    async fn test_connections_refused_while_not_listening() {
        let (_handle, mut rx, addr) = started(false).await;

        let _client = TcpStream::connect(addr).await.unwrap();

        assert!(
            timeout(Duration::from_millis(300), rx.recv()).await.is_err(),
            "no Connected event while listening is stopped"
        );
    }

    #[tokio::test]
    async fn test_handle_errors_after_shutdown() {
        let (handle, _rx, _addr) = started(true).await;
        handle.shutdown().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(matches!(
            handle.start_listening().await,
            Err(SessionError::ListenerGone)
        ));
    }
}
