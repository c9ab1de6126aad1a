/// Address collection
///
/// Gathers candidate addresses for the local node from network
/// interfaces and from public IP echo endpoints.

pub mod interfaces;
pub mod public_ip;

pub use interfaces::{filter_interfaces, InterfaceSource, NetworkInterface, SystemInterfaces};
pub use public_ip::{fetch_public_ip, parse_echo_body, IpFamily};

use beacon_common::{Address, AddressError, CollectorConfig, Protocol};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Address collection errors
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Failed to enumerate interfaces: {0}")]
    Interfaces(#[from] std::io::Error),

    #[error("IP echo request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IP echo returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Address(#[from] AddressError),
}

/// A step of [`AddressCollector::collect_best_effort`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectStep {
    Interfaces,
    PublicIpv4,
    PublicIpv6,
}

impl fmt::Display for CollectStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interfaces => write!(f, "interfaces"),
            Self::PublicIpv4 => write!(f, "public-ipv4"),
            Self::PublicIpv6 => write!(f, "public-ipv6"),
        }
    }
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: CollectStep,
    pub error: CollectError,
}

/// Addresses gathered by a best-effort run plus the steps that failed
#[derive(Debug, Default)]
pub struct CollectReport {
    pub addresses: Vec<Address>,
    pub failures: Vec<StepFailure>,
}

impl CollectReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_steps(&self) -> Vec<CollectStep> {
        self.failures.iter().map(|f| f.step).collect()
    }
}

pub struct AddressCollector {
    interfaces: Arc<dyn InterfaceSource>,
    client: Client,
    ipv4_echo_url: String,
    ipv6_echo_url: String,
    denied_interfaces: Vec<String>,
}

impl AddressCollector {
    pub fn new(config: &CollectorConfig) -> Result<Self, CollectError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            interfaces: Arc::new(SystemInterfaces),
            client,
            ipv4_echo_url: config.ipv4_echo_url.clone(),
            ipv6_echo_url: config.ipv6_echo_url.clone(),
            denied_interfaces: config.denied_interfaces.clone(),
        })
    }

    /// Replace the interface source (tests, sandboxes)
    pub fn with_interface_source(mut self, source: Arc<dyn InterfaceSource>) -> Self {
        self.interfaces = source;
        self
    }

    /// Non-loopback addresses of interfaces outside the deny list
    pub fn collect_from_interfaces(
        &self,
        port: u16,
        protocol: Protocol,
    ) -> Result<Vec<Address>, CollectError> {
        let interfaces = self.interfaces.interfaces()?;
        let kept = filter_interfaces(interfaces, &self.denied_interfaces);

        let addresses = kept
            .into_iter()
            .map(|iface| {
                debug!("interface {} has {}", iface.name, iface.ip);
                Address::new(protocol, iface.ip, port)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(addresses)
    }

    pub async fn collect_public_ipv4(
        &self,
        port: u16,
        protocol: Protocol,
    ) -> Result<Address, CollectError> {
        let ip = fetch_public_ip(&self.client, &self.ipv4_echo_url, IpFamily::V4).await?;
        Ok(Address::new(protocol, ip, port)?)
    }

    pub async fn collect_public_ipv6(
        &self,
        port: u16,
        protocol: Protocol,
    ) -> Result<Address, CollectError> {
        let ip = fetch_public_ip(&self.client, &self.ipv6_echo_url, IpFamily::V6).await?;
        Ok(Address::new(protocol, ip, port)?)
    }

    /// Run every step in order, keeping whatever succeeds
    pub async fn collect_best_effort(&self, port: u16, protocol: Protocol) -> CollectReport {
        let mut report = CollectReport::default();

        match self.collect_from_interfaces(port, protocol) {
            Ok(addresses) => report.addresses.extend(addresses),
            Err(error) => report.failures.push(StepFailure {
                step: CollectStep::Interfaces,
                error,
            }),
        }

        match self.collect_public_ipv4(port, protocol).await {
            Ok(address) => report.addresses.push(address),
            Err(error) => report.failures.push(StepFailure {
                step: CollectStep::PublicIpv4,
                error,
            }),
        }

        match self.collect_public_ipv6(port, protocol).await {
            Ok(address) => report.addresses.push(address),
            Err(error) => report.failures.push(StepFailure {
                step: CollectStep::PublicIpv6,
                error,
            }),
        }

        for failure in &report.failures {
            warn!("address collection step {} failed: {}", failure.step, failure.error);
        }

        report
    }
}
