use thiserror::Error;

/// Common error type for Beacon
#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for Beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;

impl BeaconError {
    pub fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::InvalidAddress(msg.into())
    }
}

impl From<crate::types::AddressError> for BeaconError {
    fn from(err: crate::types::AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<crate::config::ConfigError> for BeaconError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
