//! Outbound HTTP client and Gemini endpoint construction.

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use std::time::Duration;

/// Upper bound on a single upstream call, connect through last body byte.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the client shared by all requests.
///
/// With a configured proxy every request goes through it; without one,
/// proxy environment variables are ignored.
pub fn build_client(config: &RelayConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(UPSTREAM_TIMEOUT);

    builder = match config.proxy.as_deref().filter(|p| !p.is_empty()) {
        Some(proxy_url) => {
            let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                RelayError::config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
            })?;
            builder.proxy(proxy)
        }
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}

/// `generateContent` endpoint for a model. The API key travels separately as
/// the `key` query parameter.
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}
