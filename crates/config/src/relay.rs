//! Relay configuration: where completions are sent and how browsers may call us.

use std::borrow::Cow;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Configuration of the relay handler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// The path under which the relay accepts requests. Every sub-path is relayed as well.
    pub path: Cow<'static, str>,

    /// Default URL of the completion service.
    pub api_url: Option<Url>,

    /// API key sent to the completion service as a bearer token.
    pub api_key: Option<SecretString>,

    /// Model used when the request does not name one.
    pub default_model: Option<String>,

    /// Comma-separated list of origins allowed to call the relay from a browser.
    /// The first entry is returned to callers whose origin is not in the list.
    pub allowed_origins: String,

    /// Whether cross-origin headers are attached to responses.
    pub cors: bool,

    /// Whether requests may choose the completion service URL with `apiUrl`.
    pub allow_url_override: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            path: Cow::Borrowed("/"),
            api_url: None,
            api_key: None,
            default_model: None,
            allowed_origins: String::from("*"),
            cors: true,
            allow_url_override: true,
        }
    }
}
