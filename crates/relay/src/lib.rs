//! Text relay.
//!
//! Accepts a text payload, forwards it to a completion service with the configured credentials
//! and defaults, and relays the answer back wrapped in a `{"result": ...}` envelope.

#![deny(missing_docs)]

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
};
use config::RelayConfig;
use secrecy::SecretString;
use serde_json::Value;

mod cors;
mod error;
mod messages;
mod upstream;

pub use cors::AllowedOrigins;
pub use error::RelayError;
pub use messages::{ChatMessage, CompletionRequest, ContentPart, DEFAULT_INSTRUCTION, MAX_TOKENS, Role};
pub use upstream::{HttpUpstream, Upstream, UpstreamError};

use cors::CorsHeaders;
use messages::{InboundPayload, RelayResponse};

pub(crate) type Result<T> = std::result::Result<T, RelayError>;

/// Creates an axum router relaying to the completion service over HTTP.
pub fn router(config: RelayConfig) -> anyhow::Result<Router> {
    let upstream = HttpUpstream::new().map_err(|e| anyhow!("Failed to initialize the upstream client: {e}"))?;
    router_with_upstream(config, Arc::new(upstream))
}

/// Creates an axum router relaying through the given upstream.
///
/// The relay answers on the configured path and on every path below it.
pub fn router_with_upstream(config: RelayConfig, upstream: Arc<dyn Upstream>) -> anyhow::Result<Router> {
    let base = config.path.trim_end_matches('/').to_string();
    let state = Arc::new(RelayState::new(config, upstream)?);

    let root = if base.is_empty() { "/" } else { base.as_str() };
    let catch_all = format!("{base}/{{*rest}}");

    Ok(Router::new()
        .route(root, any(relay))
        .route(&catch_all, any(relay))
        .with_state(state))
}

struct RelayState {
    upstream: Arc<dyn Upstream>,
    api_url: String,
    api_key: SecretString,
    default_model: String,
    origins: AllowedOrigins,
    cors: bool,
    allow_url_override: bool,
}

impl RelayState {
    fn new(config: RelayConfig, upstream: Arc<dyn Upstream>) -> anyhow::Result<Self> {
        let api_url = config
            .api_url
            .ok_or_else(|| anyhow!("No completion service URL configured"))?;

        let api_key = config
            .api_key
            .ok_or_else(|| anyhow!("No completion service API key configured"))?;

        let default_model = config
            .default_model
            .filter(|model| !model.trim().is_empty())
            .ok_or_else(|| anyhow!("No default model configured"))?;

        Ok(Self {
            upstream,
            api_url: api_url.to_string(),
            api_key,
            default_model,
            origins: AllowedOrigins::parse(&config.allowed_origins),
            cors: config.cors,
            allow_url_override: config.allow_url_override,
        })
    }

    fn upstream_url<'a>(&'a self, payload: &'a InboundPayload) -> &'a str {
        if self.allow_url_override
            && let Some(url) = payload.api_url()
        {
            url
        } else {
            &self.api_url
        }
    }
}

/// Handle every request reaching the relay.
///
/// Cross-origin headers are decided up front and attached to whatever the request ends in.
async fn relay(State(state): State<Arc<RelayState>>, method: Method, headers: HeaderMap, body: Bytes) -> Response {
    let cors = state.cors.then(|| CorsHeaders::for_request(&headers, &state.origins));

    let mut response = match handle(&state, method, &body).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    };

    if let Some(cors) = cors {
        cors.apply(response.headers_mut());
    }

    response
}

async fn handle(state: &RelayState, method: Method, body: &[u8]) -> Result<Response> {
    if method == Method::OPTIONS {
        log::debug!("Answering preflight request");
        return Ok(StatusCode::OK.into_response());
    }

    if method != Method::POST {
        log::debug!("Rejecting {method} request");
        return Err(RelayError::MethodNotAllowed);
    }

    let payload = match serde_json::from_slice::<Value>(body)? {
        Value::Object(fields) => InboundPayload::from_fields(fields),
        Value::Null => return Err(RelayError::NullBody),
        // Scalars and arrays have no `text` member.
        _ => InboundPayload::default(),
    };

    let Some(text) = payload.validated_text() else {
        log::debug!("Rejecting request without text content");
        return Err(RelayError::TextRequired);
    };

    let url = state.upstream_url(&payload);
    let request = CompletionRequest::build(&payload, text, &state.default_model);

    log::debug!("Relaying {} bytes of text to model {}", text.len(), request.model);

    let result = state.upstream.complete(url, &state.api_key, &request).await?;

    log::debug!("Completion service answered, relaying result");

    Ok(Json(RelayResponse { result }).into_response())
}
