//! Textrelay configuration structures to map the textrelay.toml configuration.

#![deny(missing_docs)]

mod loader;
mod relay;

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

pub use relay::RelayConfig;
use serde::Deserialize;

/// Main configuration structure for the Textrelay application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Relay configuration settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Overrides relay settings from the process environment.
    ///
    /// Reads `OPENAI_API_DEFAULT_URL`, `OPENAI_API_KEY`, `OPENAI_DEFAULT_MODEL` and `ALLOWED_ORIGINS`.
    pub fn apply_process_env(&mut self) -> anyhow::Result<()> {
        loader::apply_env(self, |name| std::env::var(name).ok())
    }

    /// Overrides relay settings from the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        loader::apply_env(self, lookup)
    }

    /// Validates that the relay has everything it needs to reach the completion service.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }
}

/// HTTP server configuration settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// TLS configuration for secure connections.
    pub tls: Option<TlsServerConfig>,
}

/// TLS configuration for secure connections.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsServerConfig {
    /// Path to the TLS certificate PEM file.
    pub certificate: PathBuf,
    /// Path to the TLS private key PEM file.
    pub key: PathBuf,
}
