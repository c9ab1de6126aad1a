pub mod config;
pub mod error;
pub mod types;

pub use config::{
    BeaconConfig, CollectorConfig, ConfigError, DiscoveryConfig, IdentityConfig, RegistryConfig,
};
pub use error::{BeaconError, Result};
pub use types::{Address, AddressError, Protocol, Timestamp};
