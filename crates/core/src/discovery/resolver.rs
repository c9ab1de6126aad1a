/// DNS discovery resolver
///
/// Maps a room to its member links (`<room>.room.<domain>`) and each
/// member to its advertised records (`<link>.node.<domain>`).

use super::{DnsTxtLookup, LookupError, TxtLookup};
use crate::state::NodeState;
use beacon_common::config::discovery::{NODE_LABEL, ROOM_LABEL};
use beacon_common::DiscoveryConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A member whose records could not be resolved during a pull
#[derive(Debug)]
pub struct MemberFailure {
    pub link: String,
    pub error: LookupError,
}

/// Outcome of [`DiscoveryResolver::pull_all`]
#[derive(Debug, Default)]
pub struct PullReport {
    /// Every link listed for the room
    pub members: Vec<String>,

    /// Links whose records were resolved and committed
    pub resolved: Vec<String>,

    pub failures: Vec<MemberFailure>,
}

impl PullReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct DiscoveryResolver {
    lookup: Arc<dyn TxtLookup>,
    domain: String,
}

impl DiscoveryResolver {
    pub fn new(lookup: Arc<dyn TxtLookup>, domain: impl Into<String>) -> Self {
        Self {
            lookup,
            domain: domain.into(),
        }
    }

    /// Resolver backed by the system DNS configuration
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, LookupError> {
        let lookup = DnsTxtLookup::from_system_conf(config.dns_timeout())?;
        Ok(Self::new(Arc::new(lookup), config.domain.clone()))
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn room_domain(&self, room: &str) -> String {
        format!("{}.{}.{}", room, ROOM_LABEL, self.domain)
    }

    pub fn node_domain(&self, link: &str) -> String {
        format!("{}.{}.{}", link, NODE_LABEL, self.domain)
    }

    /// Links of every node registered in `room`
    pub async fn list_room_members(&self, room: &str) -> Result<Vec<String>, LookupError> {
        self.lookup.lookup_txt(&self.room_domain(room)).await
    }

    /// Raw records advertised by one member
    pub async fn resolve_member_addresses(&self, link: &str) -> Result<Vec<String>, LookupError> {
        self.lookup.lookup_txt(&self.node_domain(link)).await
    }

    /// List the room, resolve each member and commit the results
    ///
    /// Failing to list the room is an error. A member that fails to
    /// resolve is reported in [`PullReport::failures`] and leaves its
    /// existing peer entry untouched; the other members are still
    /// committed. No lock on `state` is held while querying DNS.
    pub async fn pull_all(&self, room: &str, state: &NodeState) -> Result<PullReport, LookupError> {
        let members = self.list_room_members(room).await?;
        debug!("room {} lists {} members", room, members.len());

        let mut report = PullReport {
            members: members.clone(),
            ..PullReport::default()
        };

        for link in members {
            match self.resolve_member_addresses(&link).await {
                Ok(records) => {
                    state.upsert_peer(link.clone(), records).await;
                    report.resolved.push(link);
                }
                Err(error) => {
                    warn!("failed to resolve member {}: {}", link, error);
                    report.failures.push(MemberFailure { link, error });
                }
            }
        }

        info!(
            "pulled room {}: {} resolved, {} failed",
            room,
            report.resolved.len(),
            report.failures.len()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{KeyPair, RoomIdentity};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Fixture resolver: names missing from the map fail like NXDOMAIN
    struct StaticTxtLookup {
        records: HashMap<String, Vec<String>>,
    }

    impl StaticTxtLookup {
        fn new(entries: Vec<(&str, Vec<&str>)>) -> Self {
            let records = entries
                .into_iter()
                .map(|(name, values)| {
                    (
                        name.to_string(),
                        values.into_iter().map(|v| v.to_string()).collect(),
                    )
                })
                .collect();
            Self { records }
        }
    }

    #[async_trait]
    impl TxtLookup for StaticTxtLookup {
        async fn lookup_txt(&self, name: &str) -> Result<Vec<String>, LookupError> {
            self.records
                .get(name)
                .cloned()
                .ok_or_else(|| LookupError::Resolve {
                    name: name.to_string(),
                    reason: "no records found".to_string(),
                })
        }
    }

    fn test_state() -> NodeState {
        let keypair = KeyPair::from_secret_bytes(&[4u8; 32]);
        NodeState::new(RoomIdentity::from_keypair(&keypair).unwrap())
    }

    fn resolver(entries: Vec<(&str, Vec<&str>)>) -> DiscoveryResolver {
        DiscoveryResolver::new(Arc::new(StaticTxtLookup::new(entries)), "beacon.test")
    }

    #[test]
    fn test_domains() {
        let resolver = resolver(vec![]);
        assert_eq!(resolver.room_domain("abc"), "abc.room.beacon.test");
        assert_eq!(resolver.node_domain("n1"), "n1.node.beacon.test");
    }

    #[tokio::test]
    async fn test_pull_all_maps_members_to_records() {
        let resolver = resolver(vec![
            ("abc.room.beacon.test", vec!["n1", "n2"]),
            ("n1.node.beacon.test", vec!["10.0.0.1:80/tcp"]),
            ("n2.node.beacon.test", vec![]),
        ]);
        let state = test_state();

        let report = resolver.pull_all("abc", &state).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.members, vec!["n1", "n2"]);

        let peers = state.get_peers().await;
        assert_eq!(peers.len(), 2);
        assert_eq!(peers["n1"].records, vec!["10.0.0.1:80/tcp".to_string()]);
        assert!(peers["n2"].records.is_empty());
    }

    #[tokio::test]
    async fn test_pull_all_fails_when_room_lookup_fails() {
        let resolver = resolver(vec![]);
        let state = test_state();

        let err = resolver.pull_all("missing", &state).await.unwrap_err();
        assert!(matches!(err, LookupError::Resolve { .. }));
        assert_eq!(state.peer_count().await, 0);
    }

    #[tokio::test]
    async fn test_pull_all_isolates_member_failures() {
        let resolver = resolver(vec![
            ("abc.room.beacon.test", vec!["n1", "broken", "n3"]),
            ("n1.node.beacon.test", vec!["10.0.0.1:80/tcp"]),
            ("n3.node.beacon.test", vec!["10.0.0.3:443/udp"]),
        ]);
        let state = test_state();
        state.upsert_peer("broken", vec!["old".to_string()]).await;

        let report = resolver.pull_all("abc", &state).await.unwrap();
        assert!(!report.is_complete());
        assert_eq!(report.resolved, vec!["n1", "n3"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].link, "broken");

        let peers = state.get_peers().await;
        assert_eq!(peers["n3"].records, vec!["10.0.0.3:443/udp".to_string()]);
        assert_eq!(peers["broken"].records, vec!["old".to_string()]);
    }

    #[tokio::test]
    async fn test_list_and_resolve() {
        let resolver = resolver(vec![
            ("abc.room.beacon.test", vec!["n1"]),
            ("n1.node.beacon.test", vec!["a", "b"]),
        ]);

        assert_eq!(resolver.list_room_members("abc").await.unwrap(), vec!["n1"]);
        assert_eq!(
            resolver.resolve_member_addresses("n1").await.unwrap(),
            vec!["a", "b"]
        );
        assert!(resolver.resolve_member_addresses("n2").await.is_err());
    }
}
