use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Transport protocol a node listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => Err(AddressError::InvalidProtocol(other.to_string())),
        }
    }
}

/// An address a node advertises: `protocol`, `ip`, `port`
///
/// Field order is part of the registration wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub protocol: Protocol,
    pub ip: IpAddr,
    pub port: u16,
}

impl Address {
    /// Create a validated address
    pub fn new(protocol: Protocol, ip: IpAddr, port: u16) -> Result<Self, AddressError> {
        let address = Self { protocol, ip, port };
        address.validate()?;
        Ok(address)
    }

    /// Parse an address from loosely typed parts
    pub fn parse(ip: &str, port: u32, protocol: &str) -> Result<Self, AddressError> {
        let ip = ip
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| AddressError::InvalidIp(ip.to_string()))?;
        let port = u16::try_from(port).map_err(|_| AddressError::InvalidPort(port))?;
        Self::new(protocol.parse()?, ip, port)
    }

    /// Port must lie in [1, 65535]
    pub fn validate(&self) -> Result<(), AddressError> {
        if self.port == 0 {
            return Err(AddressError::InvalidPort(0));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.socket_addr(), self.protocol)
    }
}

/// Address validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid port: {0} (expected 1-65535)")]
    InvalidPort(u32),

    #[error("Invalid IP address: {0}")]
    InvalidIp(String),

    #[error("Invalid protocol: {0} (expected tcp or udp)")]
    InvalidProtocol(String),
}

/// Timestamp in Unix epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        // A clock before 1970 reads as the epoch.
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn elapsed(&self) -> Duration {
        let now = Self::now();
        Duration::from_secs(now.0.saturating_sub(self.0))
    }
}
