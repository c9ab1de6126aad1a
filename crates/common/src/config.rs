use crate::types::Protocol;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Rendezvous registry constants
pub mod registry {
    /// Registration endpoint of the hosted rendezvous service
    pub const DEFAULT_REGISTER_URL: &str = "https://pathfinderbeacon.net/register";

    /// How long the registry keeps a registration before delisting the node
    pub const REGISTRATION_TTL_SECS: u64 = 3600;

    /// Re-announce interval, comfortably inside the registration TTL
    pub const DEFAULT_ANNOUNCE_INTERVAL_SECS: u64 = 3000;

    /// HTTP request timeout
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
}

/// DNS discovery constants
pub mod discovery {
    /// Zone under which `room` and `node` TXT records are published
    pub const DEFAULT_DOMAIN: &str = "pathfinderbeacon.net";

    /// Label between a room name and the discovery domain
    pub const ROOM_LABEL: &str = "room";

    /// Label between a node link and the discovery domain
    pub const NODE_LABEL: &str = "node";

    /// DNS query timeout
    pub const DNS_TIMEOUT_SECS: u64 = 5;

    /// Maximum age for a discovered peer before it is considered stale
    pub const MAX_PEER_AGE_SECS: u64 = 7200; // 2 hours
}

/// Address collection constants
pub mod collector {
    /// Echo endpoint reachable over IPv4 only
    pub const DEFAULT_IPV4_ECHO_URL: &str = "https://ipv4.icanhazip.com";

    /// Echo endpoint reachable over IPv6 only
    pub const DEFAULT_IPV6_ECHO_URL: &str = "https://ipv6.icanhazip.com";

    /// Interface name substrings skipped during enumeration
    pub const DEFAULT_DENIED_INTERFACES: &[&str] = &["docker", "br-", "veth", "lo"];

    /// Default port advertised for collected addresses
    pub const DEFAULT_PORT: u16 = 9090;
}

/// Top level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    pub registry: RegistryConfig,
    pub discovery: DiscoveryConfig,
    pub collector: CollectorConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Full URL registrations are POSTed to
    pub register_url: String,

    pub request_timeout_secs: u64,

    pub announce_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            register_url: registry::DEFAULT_REGISTER_URL.to_string(),
            request_timeout_secs: registry::REQUEST_TIMEOUT_SECS,
            announce_interval_secs: registry::DEFAULT_ANNOUNCE_INTERVAL_SECS,
        }
    }
}

impl RegistryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn announce_interval(&self) -> Duration {
        Duration::from_secs(self.announce_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub domain: String,

    pub dns_timeout_secs: u64,

    /// Peers not refreshed within this window are pruned
    pub peer_max_age_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            domain: discovery::DEFAULT_DOMAIN.to_string(),
            dns_timeout_secs: discovery::DNS_TIMEOUT_SECS,
            peer_max_age_secs: discovery::MAX_PEER_AGE_SECS,
        }
    }
}

impl DiscoveryConfig {
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn peer_max_age(&self) -> Duration {
        Duration::from_secs(self.peer_max_age_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub ipv4_echo_url: String,

    pub ipv6_echo_url: String,

    pub denied_interfaces: Vec<String>,

    /// Port and protocol advertised alongside collected IPs
    pub port: u16,

    pub protocol: Protocol,

    pub request_timeout_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            ipv4_echo_url: collector::DEFAULT_IPV4_ECHO_URL.to_string(),
            ipv6_echo_url: collector::DEFAULT_IPV6_ECHO_URL.to_string(),
            denied_interfaces: collector::DEFAULT_DENIED_INTERFACES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            port: collector::DEFAULT_PORT,
            protocol: Protocol::Tcp,
            request_timeout_secs: registry::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl CollectorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Identity configuration
///
/// Without a private key a fresh keypair is generated at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// PKCS#8 PEM encoded Ed25519 private key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_pem: Option<String>,
}

impl BeaconConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_register_url(mut self, url: impl Into<String>) -> Self {
        self.registry.register_url = url.into();
        self
    }

    pub fn with_discovery_domain(mut self, domain: impl Into<String>) -> Self {
        self.discovery.domain = domain.into();
        self
    }

    pub fn with_echo_urls(mut self, ipv4: impl Into<String>, ipv6: impl Into<String>) -> Self {
        self.collector.ipv4_echo_url = ipv4.into();
        self.collector.ipv6_echo_url = ipv6.into();
        self
    }

    pub fn with_port(mut self, port: u16, protocol: Protocol) -> Self {
        self.collector.port = port;
        self.collector.protocol = protocol;
        self
    }

    pub fn with_private_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.identity.private_key_pem = Some(pem.into());
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Reject intervals and timeouts that cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("registry.request_timeout_secs", self.registry.request_timeout_secs),
            ("registry.announce_interval_secs", self.registry.announce_interval_secs),
            ("discovery.dns_timeout_secs", self.discovery.dns_timeout_secs),
            ("discovery.peer_max_age_secs", self.discovery.peer_max_age_secs),
            ("collector.request_timeout_secs", self.collector.request_timeout_secs),
        ];

        for (field, secs) in durations {
            if secs == 0 {
                return Err(ConfigError::InvalidValue(format!("{} must be non-zero", field)));
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &PathBuf) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Failed to serialize config: {0}")]
    SerializeError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
