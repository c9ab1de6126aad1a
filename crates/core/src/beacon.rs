/// Beacon runtime
///
/// Ties the identity, node state, collector, registry client and
/// discovery resolver together. Network calls always work on a state
/// snapshot and commit results afterwards.

use crate::announce::{AnnounceError, RegistrationPayload, RegistryClient};
use crate::collector::{AddressCollector, CollectReport};
use crate::discovery::{DiscoveryResolver, LookupError, PullReport};
use crate::identity::{Identity, IdentitySource, RoomIdentity, RoomName};
use crate::state::{NodeState, PeerNode, SelfNode};
use beacon_common::{Address, AddressError, BeaconConfig, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct Beacon {
    identity: Identity,
    config: BeaconConfig,
    state: Arc<NodeState>,
    registry: RegistryClient,
    resolver: DiscoveryResolver,
    collector: AddressCollector,
}

impl Beacon {
    /// Build a beacon with system DNS and interface sources
    pub fn new(config: BeaconConfig) -> Result<Self> {
        let source = IdentitySource::from_private_pem(config.identity.private_key_pem.as_deref())?;
        let resolver = DiscoveryResolver::from_config(&config.discovery)?;
        let collector = AddressCollector::new(&config.collector)?;

        Self::from_parts(config, source, resolver, collector)
    }

    /// Build a beacon from explicit components
    pub fn from_parts(
        config: BeaconConfig,
        source: IdentitySource,
        resolver: DiscoveryResolver,
        collector: AddressCollector,
    ) -> Result<Self> {
        config.validate()?;

        let identity = Identity::from_source(source)?;
        let registry = RegistryClient::new(&config.registry)?;
        let state = Arc::new(NodeState::new(identity.room_identity().clone()));

        info!("Room: {}", identity.room_name());
        debug!("Public Key: {}", identity.public_key());

        Ok(Self {
            identity,
            config,
            state,
            registry,
            resolver,
            collector,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    /// Shared handle to the node state
    pub fn state(&self) -> Arc<NodeState> {
        self.state.clone()
    }

    pub fn room_name(&self) -> &RoomName {
        self.identity.room_name()
    }

    pub fn room_identity(&self) -> &RoomIdentity {
        self.identity.room_identity()
    }

    pub fn room_signature_base64(&self) -> &str {
        &self.identity.room_identity().signature
    }

    pub fn public_key_base64(&self) -> &str {
        &self.identity.room_identity().public_key
    }

    pub async fn add_address(
        &self,
        ip: &str,
        port: u32,
        protocol: &str,
    ) -> std::result::Result<(), AddressError> {
        self.state.add_address(Address::parse(ip, port, protocol)?).await
    }

    /// Collect addresses with the configured port/protocol and store the successes
    pub async fn collect_addresses(&self) -> CollectReport {
        let port = self.config.collector.port;
        let protocol = self.config.collector.protocol;

        let report = self.collector.collect_best_effort(port, protocol).await;

        // Collected addresses are validated on construction
        if let Err(e) = self.state.add_addresses(report.addresses.clone()).await {
            tracing::warn!("Discarding collected addresses: {}", e);
        }

        info!(
            "Collected {} addresses ({} steps failed)",
            report.addresses.len(),
            report.failures.len()
        );
        report
    }

    /// Registration body for the current state
    pub async fn registration_payload(&self) -> RegistrationPayload {
        RegistrationPayload::from(&self.state.get_self().await)
    }

    pub async fn registration_json(&self) -> std::result::Result<String, AnnounceError> {
        self.registration_payload().await.to_json_string()
    }

    /// Push the current addresses to the registry
    ///
    /// The registration expires after an hour; call this again before then.
    pub async fn announce(&self) -> std::result::Result<(), AnnounceError> {
        let snapshot = self.state.get_self().await;
        self.registry.announce(&snapshot).await?;

        info!(
            "Announced {} addresses to {}",
            snapshot.addresses.len(),
            self.registry.register_url()
        );
        Ok(())
    }

    /// Discover the other members of our room
    pub async fn pull_peers(&self) -> std::result::Result<PullReport, LookupError> {
        self.resolver
            .pull_all(self.room_name().as_str(), &self.state)
            .await
    }

    /// Drop peers older than the configured maximum age
    pub async fn prune_stale_peers(&self) -> Vec<String> {
        let removed = self
            .state
            .prune_stale_peers(self.config.discovery.peer_max_age())
            .await;
        if !removed.is_empty() {
            info!("Pruned {} stale peers", removed.len());
        }
        removed
    }

    pub async fn self_node(&self) -> SelfNode {
        self.state.get_self().await
    }

    pub async fn peers(&self) -> HashMap<String, PeerNode> {
        self.state.get_peers().await
    }

    pub async fn stats(&self) -> BeaconStats {
        BeaconStats {
            room: self.room_name().clone(),
            addresses: self.state.address_count().await,
            peers: self.state.peer_count().await,
        }
    }
}

/// Beacon statistics
#[derive(Debug, Clone)]
pub struct BeaconStats {
    pub room: RoomName,
    pub addresses: usize,
    pub peers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{InterfaceSource, NetworkInterface};
    use crate::discovery::TxtLookup;
    use crate::identity::{verify_room_signature, KeyPair};
    use async_trait::async_trait;
    use std::io;
    use std::net::{IpAddr, Ipv4Addr};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct OneInterface;

    impl InterfaceSource for OneInterface {
        fn interfaces(&self) -> io::Result<Vec<NetworkInterface>> {
            Ok(vec![NetworkInterface::new(
                "eth0",
                IpAddr::V4(Ipv4Addr::new(192, 168, 0, 6)),
            )])
        }
    }

    /// Answers for whichever room the beacon owns
    struct RoomLookup {
        room: String,
    }

    #[async_trait]
    impl TxtLookup for RoomLookup {
        async fn lookup_txt(&self, name: &str) -> std::result::Result<Vec<String>, LookupError> {
            if name == format!("{}.room.beacon.test", self.room) {
                Ok(vec!["peer1".to_string()])
            } else if name == "peer1.node.beacon.test" {
                Ok(vec!["10.0.0.9:4000/udp".to_string()])
            } else {
                Err(LookupError::Resolve {
                    name: name.to_string(),
                    reason: "NXDOMAIN".to_string(),
                })
            }
        }
    }

    async fn test_beacon(server: &MockServer) -> Beacon {
        let keypair = KeyPair::from_secret_bytes(&[8u8; 32]);
        let room = RoomName::from_public_key(&keypair.public_key()).to_string();

        let config = BeaconConfig::new()
            .with_register_url(format!("{}/register", server.uri()))
            .with_discovery_domain("beacon.test")
            .with_echo_urls(format!("{}/v4", server.uri()), format!("{}/v6", server.uri()));

        let resolver = DiscoveryResolver::new(Arc::new(RoomLookup { room }), "beacon.test");
        let collector = AddressCollector::new(&config.collector)
            .unwrap()
            .with_interface_source(Arc::new(OneInterface));

        Beacon::from_parts(config, IdentitySource::Provided(keypair), resolver, collector).unwrap()
    }

    #[tokio::test]
    async fn test_identity_is_verifiable() {
        let server = MockServer::start().await;
        let beacon = test_beacon(&server).await;

        assert!(verify_room_signature(
            beacon.room_name().as_str(),
            beacon.room_signature_base64(),
            beacon.public_key_base64()
        )
        .unwrap());
    }

    #[tokio::test]
    async fn test_full_cycle() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v6"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let beacon = test_beacon(&server).await;
        beacon.add_address("10.0.0.1", 443, "tcp").await.unwrap();

        let report = beacon.collect_addresses().await;
        assert_eq!(report.addresses.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(beacon.self_node().await.addresses.len(), 3);

        beacon.announce().await.unwrap();

        let pull = beacon.pull_peers().await.unwrap();
        assert!(pull.is_complete());
        let peers = beacon.peers().await;
        assert_eq!(peers["peer1"].records, vec!["10.0.0.9:4000/udp".to_string()]);

        let stats = beacon.stats().await;
        assert_eq!(stats.addresses, 3);
        assert_eq!(stats.peers, 1);
    }

    #[tokio::test]
    async fn test_registration_json_reflects_state() {
        let server = MockServer::start().await;
        let beacon = test_beacon(&server).await;
        beacon.add_address("127.0.0.1", 53, "udp").await.unwrap();

        let json = beacon.registration_json().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["room"], beacon.room_name().as_str());
        assert_eq!(value["addresses"][0]["port"], 53);
    }

    #[tokio::test]
    async fn test_zero_announce_interval_rejected() {
        let mut config = BeaconConfig::new();
        config.registry.announce_interval_secs = 0;

        let resolver = DiscoveryResolver::new(
            Arc::new(RoomLookup {
                room: String::new(),
            }),
            "beacon.test",
        );
        let collector = AddressCollector::new(&config.collector).unwrap();

        let result = Beacon::from_parts(config, IdentitySource::Generated, resolver, collector);
        assert!(matches!(result, Err(beacon_common::BeaconError::Config(_))));
    }

    #[tokio::test]
    async fn test_add_address_validates() {
        let server = MockServer::start().await;
        let beacon = test_beacon(&server).await;

        assert!(beacon.add_address("10.0.0.1", 0, "tcp").await.is_err());
        assert!(beacon.add_address("10.0.0.1", 80, "quic").await.is_err());
        assert_eq!(beacon.self_node().await.addresses.len(), 0);
    }
}
