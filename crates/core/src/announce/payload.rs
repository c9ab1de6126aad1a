use super::AnnounceError;
use crate::state::SelfNode;
use beacon_common::Address;
use serde::{Deserialize, Serialize};

/// Registration body sent to the rendezvous registry
///
/// Field order is fixed: `room`, `publicKey`, `roomSignature`, `addresses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub room: String,

    /// Base64 of the SPKI PEM public key
    pub public_key: String,

    /// Base64 signature over `room`
    pub room_signature: String,

    pub addresses: Vec<Address>,
}

impl RegistrationPayload {
    /// Compact JSON encoding
    pub fn to_json(&self) -> Result<Vec<u8>, AnnounceError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, AnnounceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, AnnounceError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl From<&SelfNode> for RegistrationPayload {
    fn from(node: &SelfNode) -> Self {
        Self {
            room: node.identity.name.to_string(),
            public_key: node.identity.public_key.clone(),
            room_signature: node.identity.signature.clone(),
            addresses: node.addresses.clone(),
        }
    }
}
