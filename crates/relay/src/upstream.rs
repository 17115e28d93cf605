use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;

use crate::messages::CompletionRequest;

/// Failure to obtain a decoded answer from the completion service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request could not be sent or the response body could not be read.
    #[error("{0}")]
    Connection(String),

    /// The completion service answered with something that is not JSON.
    #[error("{0}")]
    InvalidResponse(String),

    /// The failure carried no description.
    #[error("")]
    Unknown,
}

/// Capability of sending one completion request and returning the decoded answer.
///
/// Note for async_trait: the relay holds the upstream as a trait object, so the trait
/// has to stay dyn-compatible.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Sends `request` to `url`, authenticated with `api_key`, and returns the JSON answer untouched.
    async fn complete(
        &self,
        url: &str,
        api_key: &SecretString,
        request: &CompletionRequest,
    ) -> Result<Value, UpstreamError>;
}

/// Upstream backed by a shared `reqwest` client.
pub struct HttpUpstream {
    client: Client,
}

impl HttpUpstream {
    /// Creates the HTTP client. No timeout is set beyond the transport defaults.
    pub fn new() -> Result<Self, UpstreamError> {
        let client = Client::builder().build().map_err(|e| {
            log::error!("Failed to create HTTP client for the completion service: {e}");
            UpstreamError::Connection(e.to_string())
        })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn complete(
        &self,
        url: &str,
        api_key: &SecretString,
        request: &CompletionRequest,
    ) -> Result<Value, UpstreamError> {
        log::debug!("Sending completion request for model {} to {url}", request.model);

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to send request to the completion service: {e}");
                UpstreamError::Connection(e.to_string())
            })?;

        let status = response.status();

        // Error bodies are relayed like any other answer.
        if !status.is_success() {
            log::warn!("Completion service answered with status {status}");
        }

        let response_text = response.text().await.map_err(|e| {
            log::error!("Failed to read completion service response body: {e}");
            UpstreamError::Connection(e.to_string())
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            log::error!("Failed to parse completion service response: {e}");
            log::debug!("Raw response that failed to parse: {response_text}");
            UpstreamError::InvalidResponse(e.to_string())
        })
    }
}
