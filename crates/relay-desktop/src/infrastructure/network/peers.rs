//! Companion names learned from discovery probes.
//!
//! TCP carries no device name, so the discovery responder records the name
//! each probe announces against its source IP, and the session listener looks
//! it up when a connection from that IP arrives.
//!
//! Probes are unauthenticated UDP, so the table is bounded: once it holds
//! [`MAX_PEERS`] addresses, recording a new one evicts the least recently
//! recorded entry.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};

/// Most addresses remembered at once.
pub const MAX_PEERS: usize = 64;

/// Cloneable handle to the shared `ip -> device name` table.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    inner: Arc<Mutex<Table>>,
}

#[derive(Debug, Default)]
struct Table {
    entries: HashMap<IpAddr, Entry>,
    /// Bumped on every `record`; orders entries by recency.
    clock: u64,
}

#[derive(Debug)]
struct Entry {
    device_name: String,
    recorded_at: u64,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers `device_name` for `ip`, replacing any earlier name.
    pub fn record(&self, ip: IpAddr, device_name: impl Into<String>) {
        let Ok(mut table) = self.inner.lock() else {
            return;
        };
        table.clock += 1;
        let recorded_at = table.clock;

        if !table.entries.contains_key(&ip) && table.entries.len() >= MAX_PEERS {
            let oldest = table
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.recorded_at)
                .map(|(ip, _)| *ip);
            if let Some(oldest) = oldest {
                table.entries.remove(&oldest);
            }
        }

        table.entries.insert(
            ip,
            Entry {
                device_name: device_name.into(),
                recorded_at,
            },
        );
    }

    pub fn lookup(&self, ip: IpAddr) -> Option<String> {
        let table = self.inner.lock().ok()?;
        table.entries.get(&ip).map(|entry| entry.device_name.clone())
    }

    /// Number of addresses currently remembered.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|table| table.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the announced name for `peer`, or its IP address as text.
    pub fn display_name(&self, peer: SocketAddr) -> String {
        self.lookup(peer.ip())
            .unwrap_or_else(|| peer.ip().to_string())
    }
}
