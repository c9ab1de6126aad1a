//! HTTP client for the rendezvous registry.

use super::{AnnounceError, RegistrationPayload};
use crate::state::SelfNode;
use beacon_common::RegistryConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Pushes registrations to the registry.
///
/// The registry delists a node once its registration is older than
/// [`REGISTRATION_TTL_SECS`](beacon_common::config::registry::REGISTRATION_TTL_SECS).
/// This client never re-announces on its own; callers must call
/// [`RegistryClient::push`] again before that (the daemon uses
/// `announce_interval`, roughly once per hour).
#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    register_url: String,
}

impl RegistryClient {
    pub fn new(config: &RegistryConfig) -> Result<Self, AnnounceError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            register_url: config.register_url.clone(),
        })
    }

    pub fn register_url(&self) -> &str {
        &self.register_url
    }

    /// Send one registration. Only HTTP 200 counts as success.
    pub async fn push(&self, payload: &RegistrationPayload) -> Result<(), AnnounceError> {
        let body = payload.to_json()?;

        debug!(
            room = %payload.room,
            addresses = payload.addresses.len(),
            "pushing registration to {}",
            self.register_url
        );

        let response = self
            .client
            .post(&self.register_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AnnounceError::Rejected {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Serialize a node snapshot and push it
    pub async fn announce(&self, node: &SelfNode) -> Result<(), AnnounceError> {
        self.push(&RegistrationPayload::from(node)).await
    }
}
