//! UDP discovery datagrams.
//!
//! The companion broadcasts a [`DiscoveryProbe`] to the discovery port.  Every
//! desktop that advertises the same service answers with a unicast
//! [`DiscoveryReply`] carrying its display name and the TCP session port.
//!
//! Both datagrams are single JSON objects.  The `service` field lets several
//! unrelated tools share a port without answering each other's probes.

use serde::{Deserialize, Serialize};

use crate::protocol::codec::ProtocolError;

/// Service type advertised by the desktop and requested by the companion.
pub const SERVICE_TYPE: &str = "wristrelay";

/// Default UDP port for discovery probes.
pub const DEFAULT_DISCOVERY_PORT: u16 = 47800;

/// Default TCP port for the command session.
pub const DEFAULT_SESSION_PORT: u16 = 47801;

/// Largest discovery datagram either side will read.
pub const MAX_DATAGRAM_LEN: usize = 1024;

/// Broadcast by the companion to find desktops on the LAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryProbe {
    /// Must equal [`SERVICE_TYPE`] for the probe to be answered.
    pub service: String,
    /// Human-readable name of the companion device.
    pub device_name: String,
}

/// Sent by a desktop in answer to a matching [`DiscoveryProbe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReply {
    /// Echoes [`SERVICE_TYPE`].
    pub service: String,
    /// Human-readable name of the desktop.
    pub host_name: String,
    /// TCP port the desktop accepts the command session on.
    pub session_port: u16,
}

impl DiscoveryProbe {
    /// Creates a probe for [`SERVICE_TYPE`].
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            service: SERVICE_TYPE.to_string(),
            device_name: device_name.into(),
        }
    }

    /// Returns `true` if the probe asks for this service.
    pub fn is_for_service(&self) -> bool {
        self.service == SERVICE_TYPE
    }
}

impl DiscoveryReply {
    /// Creates a reply for [`SERVICE_TYPE`].
    pub fn new(host_name: impl Into<String>, session_port: u16) -> Self {
        Self {
            service: SERVICE_TYPE.to_string(),
            host_name: host_name.into(),
            session_port,
        }
    }

    /// Returns `true` if the reply comes from a desktop running this service.
    pub fn is_for_service(&self) -> bool {
        self.service == SERVICE_TYPE
    }
}

/// Serializes a discovery datagram.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if serialization fails.
pub fn encode_datagram<T: Serialize>(datagram: &T) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(datagram).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

/// Parses a discovery datagram.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if `bytes` is not the expected JSON shape.
pub fn decode_datagram<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(bytes).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_new_sets_service_type() {
        let probe = DiscoveryProbe::new("Kim's Watch");
        assert_eq!(probe.service, SERVICE_TYPE);
        assert!(probe.is_for_service());
    }

    #[test]
    fn test_probe_for_other_service_is_not_matched() {
        let probe = DiscoveryProbe {
            service: "kvm".to_string(),
            device_name: "x".to_string(),
        };
        assert!(!probe.is_for_service());
    }

    #[test]
    fn test_reply_decodes_from_wire_json() {
        // Arrange
        let bytes = br#"{"service":"wristrelay","host_name":"studio-mac","session_port":47801}"#;

        // Act
        let reply: DiscoveryReply = decode_datagram(bytes).unwrap();

        // Assert
        assert_eq!(reply, DiscoveryReply::new("studio-mac", 47801));
    }

    #[test]
    fn test_decode_datagram_rejects_garbage() {
        let result: Result<DiscoveryProbe, _> = decode_datagram(b"\x00\x01\x02");
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_default_ports_are_adjacent_and_distinct() {
        assert_eq!(DEFAULT_SESSION_PORT, DEFAULT_DISCOVERY_PORT + 1);
    }
}
