pub mod anthropic;

pub use anthropic::{Anthropic, AnthropicConfig};

/// Upstream trait for message-completion APIs the relay can forward to.
pub trait Upstream: Send + Sync {
    /// Human-readable name for this upstream.
    fn name(&self) -> &str;

    /// Base URL for API requests.
    fn base_url(&self) -> &str;

    /// Path of the completion endpoint on the upstream.
    fn completion_path(&self) -> &str;

    /// Whether a credential is configured at all.
    fn has_credential(&self) -> bool;

    /// Add authentication and protocol-version headers to an outgoing request.
    /// Must only be called when `has_credential()` is true.
    fn authorize_request(&self, headers: &mut http::HeaderMap);
}
