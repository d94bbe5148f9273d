use super::Upstream;

/// Anthropic upstream configuration.
pub struct AnthropicConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// Anthropic messages API: `x-api-key` auth plus a pinned `anthropic-version` marker.
pub struct Anthropic {
    base_url: String,
    api_key: Option<String>,
}

const API_VERSION: &str = "2023-06-01";

impl Anthropic {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .unwrap_or_else(|| "https://api.anthropic.com".into()),
            // Treat a blank key as unconfigured so it is never sent upstream.
            api_key: config.api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

impl Upstream for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completion_path(&self) -> &str {
        "/v1/messages"
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn authorize_request(&self, headers: &mut http::HeaderMap) {
        if let Some(key) = &self.api_key {
            if let Ok(value) = key.parse() {
                headers.insert("x-api-key", value);
            }
        }
        headers.insert(
            "anthropic-version",
            API_VERSION.parse().expect("valid header value"),
        );
    }
}
