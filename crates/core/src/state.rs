/// Shared node state
///
/// One `RwLock` guards the local node's identity, its advertised
/// addresses and the discovered peer map. Every accessor hands out an
/// owned copy, and nothing here performs network I/O, so the lock is
/// only ever held for in-memory work.

use crate::identity::{RoomIdentity, RoomName};
use beacon_common::{Address, AddressError, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// The local node: its room identity and advertised addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfNode {
    pub identity: RoomIdentity,

    /// Insertion ordered, append only
    pub addresses: Vec<Address>,
}

impl SelfNode {
    pub fn new(identity: RoomIdentity) -> Self {
        Self {
            identity,
            addresses: Vec::new(),
        }
    }
}

/// A room member learned through discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerNode {
    pub link: String,

    /// Raw discovery records, not validated as addresses
    pub records: Vec<String>,

    /// When this entry was last written
    pub last_seen: Timestamp,
}

impl PeerNode {
    pub fn new(link: impl Into<String>, records: Vec<String>) -> Self {
        Self {
            link: link.into(),
            records,
            last_seen: Timestamp::now(),
        }
    }

    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.last_seen.elapsed() > max_age
    }
}

#[derive(Debug)]
struct Inner {
    self_node: SelfNode,
    peers: HashMap<String, PeerNode>,
}

/// Concurrency-safe container shared by the collector, announcer and resolver
#[derive(Debug)]
pub struct NodeState {
    inner: RwLock<Inner>,
}

impl NodeState {
    pub fn new(identity: RoomIdentity) -> Self {
        Self {
            inner: RwLock::new(Inner {
                self_node: SelfNode::new(identity),
                peers: HashMap::new(),
            }),
        }
    }

    /// Validate and append an advertised address
    pub async fn add_address(&self, address: Address) -> Result<(), AddressError> {
        address.validate()?;

        let mut inner = self.inner.write().await;
        inner.self_node.addresses.push(address);
        Ok(())
    }

    /// Append several addresses under a single write lock
    ///
    /// Validation happens first; nothing is appended if any address is invalid.
    pub async fn add_addresses(&self, addresses: Vec<Address>) -> Result<(), AddressError> {
        for address in &addresses {
            address.validate()?;
        }

        let mut inner = self.inner.write().await;
        inner.self_node.addresses.extend(addresses);
        Ok(())
    }

    /// Snapshot of the local node
    pub async fn get_self(&self) -> SelfNode {
        let inner = self.inner.read().await;
        inner.self_node.clone()
    }

    /// Snapshot of every known peer
    pub async fn get_peers(&self) -> HashMap<String, PeerNode> {
        let inner = self.inner.read().await;
        inner.peers.clone()
    }

    /// Snapshot of peers seen within `max_age`
    pub async fn fresh_peers(&self, max_age: Duration) -> HashMap<String, PeerNode> {
        let inner = self.inner.read().await;
        inner
            .peers
            .iter()
            .filter(|(_, peer)| !peer.is_stale(max_age))
            .map(|(link, peer)| (link.clone(), peer.clone()))
            .collect()
    }

    /// Replace or insert the records for `link`; last write wins
    pub async fn upsert_peer(&self, link: impl Into<String>, records: Vec<String>) {
        self.insert_peer(PeerNode::new(link, records)).await;
    }

    pub async fn insert_peer(&self, peer: PeerNode) {
        let mut inner = self.inner.write().await;
        inner.peers.insert(peer.link.clone(), peer);
    }

    /// Remove peers not refreshed within `max_age`, returning their links
    pub async fn prune_stale_peers(&self, max_age: Duration) -> Vec<String> {
        let mut inner = self.inner.write().await;

        let stale: Vec<_> = inner
            .peers
            .iter()
            .filter(|(_, peer)| peer.is_stale(max_age))
            .map(|(link, _)| link.clone())
            .collect();

        for link in &stale {
            inner.peers.remove(link);
        }

        stale
    }

    pub async fn room_identity(&self) -> RoomIdentity {
        let inner = self.inner.read().await;
        inner.self_node.identity.clone()
    }

    pub async fn room_name(&self) -> RoomName {
        let inner = self.inner.read().await;
        inner.self_node.identity.name.clone()
    }

    pub async fn address_count(&self) -> usize {
        self.inner.read().await.self_node.addresses.len()
    }

    pub async fn peer_count(&self) -> usize {
        self.inner.read().await.peers.len()
    }
}
