use std::path::Path;

use anyhow::{Context, bail};
use indoc::indoc;
use secrecy::SecretString;
use url::Url;

use crate::Config;

/// Environment variable holding the default completion service URL.
pub(crate) const API_URL_VAR: &str = "OPENAI_API_DEFAULT_URL";
/// Environment variable holding the completion service API key.
pub(crate) const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the default model.
pub(crate) const DEFAULT_MODEL_VAR: &str = "OPENAI_DEFAULT_MODEL";
/// Environment variable holding the comma-separated allowed origins.
pub(crate) const ALLOWED_ORIGINS_VAR: &str = "ALLOWED_ORIGINS";

const EXAMPLE_CONFIG: &str = indoc! {r#"
    Example configuration:

      [relay]
      api_url = "https://api.openai.com/v1/chat/completions"
      api_key = "sk-..."
      default_model = "gpt-4o-mini"
      allowed_origins = "https://app.example.com"
"#};

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config = toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(config)
}

pub(crate) fn apply_env<F>(config: &mut Config, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let relay = &mut config.relay;

    if let Some(url) = lookup(API_URL_VAR) {
        let url = Url::parse(url.trim()).with_context(|| format!("{API_URL_VAR} is not a valid URL"))?;
        log::debug!("Completion service URL taken from {API_URL_VAR}");
        relay.api_url = Some(url);
    }

    if let Some(key) = lookup(API_KEY_VAR) {
        log::debug!("Completion service API key taken from {API_KEY_VAR}");
        relay.api_key = Some(SecretString::from(key));
    }

    if let Some(model) = lookup(DEFAULT_MODEL_VAR) {
        log::debug!("Default model taken from {DEFAULT_MODEL_VAR}");
        relay.default_model = Some(model);
    }

    if let Some(origins) = lookup(ALLOWED_ORIGINS_VAR) {
        log::debug!("Allowed origins taken from {ALLOWED_ORIGINS_VAR}");
        relay.allowed_origins = origins;
    }

    Ok(())
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    let relay = &config.relay;

    if !relay.path.starts_with('/') {
        bail!("The relay path must start with '/', got '{}'", relay.path);
    }

    let mut missing = Vec::new();

    if relay.api_url.is_none() {
        missing.push(("api_url", API_URL_VAR));
    }

    if relay.api_key.is_none() {
        missing.push(("api_key", API_KEY_VAR));
    }

    if relay.default_model.as_deref().is_none_or(|model| model.trim().is_empty()) {
        missing.push(("default_model", DEFAULT_MODEL_VAR));
    }

    if !missing.is_empty() {
        let fields = missing
            .iter()
            .map(|(field, var)| format!("  relay.{field} (or {var})"))
            .collect::<Vec<_>>()
            .join("\n");

        bail!("The relay is missing required settings:\n{fields}\n\n{EXAMPLE_CONFIG}");
    }

    if relay.cors && relay.allowed_origins.trim().is_empty() {
        log::warn!("CORS is enabled but no allowed origins are configured");
    }

    Ok(())
}
