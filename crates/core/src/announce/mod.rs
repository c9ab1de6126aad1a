/// Announce protocol
///
/// Packages the local node's room identity and addresses into a
/// registration payload and pushes it to the rendezvous registry.

pub mod client;
pub mod payload;

pub use client::RegistryClient;
pub use payload::RegistrationPayload;

/// Announce errors
#[derive(Debug, thiserror::Error)]
pub enum AnnounceError {
    #[error("Registration request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Registration rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to encode registration: {0}")]
    Serialization(#[from] serde_json::Error),
}
