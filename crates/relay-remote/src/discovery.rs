//! Finds a desktop on the LAN.
//!
//! The probe is sent to `target`, normally the broadcast address on the
//! discovery port.  Replies for other services and undecodable datagrams are
//! skipped until the deadline passes.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use relay_core::protocol::discovery::{
    decode_datagram, encode_datagram, DiscoveryProbe, DiscoveryReply, MAX_DATAGRAM_LEN,
};
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::RemoteError;

/// Limited broadcast address.
pub const BROADCAST: IpAddr = IpAddr::V4(Ipv4Addr::BROADCAST);

/// A desktop that answered a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDesktop {
    pub host_name: String,
    /// The reply's source IP combined with the advertised session port.
    pub session_addr: SocketAddr,
}

/// Sends one probe to `target` and returns the first desktop that answers.
///
/// # Errors
///
/// - [`RemoteError::DiscoveryTimeout`] if nothing answers within `wait`.
/// - [`RemoteError::Io`] if the probe cannot be sent.
pub async fn discover(
    target: SocketAddr,
    device_name: &str,
    wait: Duration,
) -> Result<DiscoveredDesktop, RemoteError> {
    let bind: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind).await?;
    socket.set_broadcast(true)?;

    let probe = encode_datagram(&DiscoveryProbe::new(device_name))?;
    socket.send_to(&probe, target).await?;
    debug!("probe sent to {target}");

    let deadline = Instant::now() + wait;
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
    loop {
        let (len, src) = timeout_at(deadline, socket.recv_from(&mut buf))
            .await
            .map_err(|_| RemoteError::DiscoveryTimeout(wait.as_millis() as u64))??;

        match decode_datagram::<DiscoveryReply>(&buf[..len]) {
            Ok(reply) if reply.is_for_service() => {
                return Ok(DiscoveredDesktop {
                    host_name: reply.host_name,
                    session_addr: SocketAddr::new(src.ip(), reply.session_port),
                });
            }
            Ok(reply) => debug!("skipping reply for service {:?} from {src}", reply.service),
            Err(e) => debug!("skipping undecodable datagram from {src}: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discover_uses_reply_source_ip_and_advertised_port() {
        // Arrange – a fake desktop on loopback
        let desk = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let desk_addr = desk.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM_LEN];
            let (len, src) = desk.recv_from(&mut buf).await.unwrap();
            let probe: DiscoveryProbe = decode_datagram(&buf[..len]).unwrap();
            assert_eq!(probe.device_name, "cli");
            desk.send_to(b"garbage", src).await.unwrap();
            let reply = encode_datagram(&DiscoveryReply::new("desk", 47999)).unwrap();
            desk.send_to(&reply, src).await.unwrap();
        });

        // Act
        let found = discover(desk_addr, "cli", Duration::from_secs(2)).await.unwrap();

        // Assert
        assert_eq!(found.host_name, "desk");
        assert_eq!(found.session_addr, "127.0.0.1:47999".parse().unwrap());
    }

    #[tokio::test]
    async fn test_discover_times_out_when_nobody_answers() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let target = silent.local_addr().unwrap();
        let result = discover(target, "cli", Duration::from_millis(200)).await;

        assert!(matches!(result, Err(RemoteError::DiscoveryTimeout(200))));
    }
}
