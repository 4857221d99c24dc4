//! The companion's end of the command session.

use std::net::SocketAddr;

use relay_core::protocol::codec::write_frame;
use relay_core::{RelayCommand, RelayMessage};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use crate::RemoteError;

/// An open command session to one desktop.
pub struct RelaySender {
    stream: TcpStream,
    peer: SocketAddr,
}

impl RelaySender {
    /// Connects to the desktop's session port.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::ConnectFailed`] if the connection is refused.
    pub async fn connect(addr: SocketAddr) -> Result<Self, RemoteError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| RemoteError::ConnectFailed { addr, source })?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, peer: addr })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Sends one record as-is, recognised or not.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Protocol`] if the record is too large or the
    /// stream fails.
    pub async fn send(&mut self, msg: &RelayMessage) -> Result<(), RemoteError> {
        write_frame(&mut self.stream, msg).await?;
        debug!("sent {}/{} to {}", msg.kind, msg.action, self.peer);
        Ok(())
    }

    /// Sends a recognised command.
    ///
    /// # Errors
    ///
    /// See [`RelaySender::send`].
    pub async fn send_command(&mut self, command: RelayCommand) -> Result<(), RemoteError> {
        self.send(&RelayMessage::from(command)).await
    }

    /// Flushes and half-closes the session so the desktop sees a clean end.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Io`] if the shutdown fails.
    pub async fn close(mut self) -> Result<(), RemoteError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
