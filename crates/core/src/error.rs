//! Conversions from module errors into [`BeaconError`].

use crate::announce::AnnounceError;
use crate::collector::CollectError;
use crate::discovery::LookupError;
use crate::identity::KeyPairError;
use beacon_common::BeaconError;

impl From<KeyPairError> for BeaconError {
    fn from(err: KeyPairError) -> Self {
        BeaconError::identity(err.to_string())
    }
}

impl From<AnnounceError> for BeaconError {
    fn from(err: AnnounceError) -> Self {
        BeaconError::network(err.to_string())
    }
}

impl From<CollectError> for BeaconError {
    fn from(err: CollectError) -> Self {
        match err {
            CollectError::InvalidAddress(msg) => BeaconError::invalid_address(msg),
            CollectError::Address(e) => BeaconError::from(e),
            other => BeaconError::network(other.to_string()),
        }
    }
}

impl From<LookupError> for BeaconError {
    fn from(err: LookupError) -> Self {
        BeaconError::lookup(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let err: BeaconError = KeyPairError::Decode("bad".into()).into();
        assert!(matches!(err, BeaconError::Identity(_)));

        let err: BeaconError = CollectError::InvalidAddress("nope".into()).into();
        assert!(matches!(err, BeaconError::InvalidAddress(_)));

        let err: BeaconError = LookupError::Timeout { name: "x".into() }.into();
        assert!(matches!(err, BeaconError::Lookup(_)));

        let err: BeaconError = AnnounceError::Rejected {
            status: 500,
            body: String::new(),
        }
        .into();
        assert!(matches!(err, BeaconError::Network(_)));
    }
}
