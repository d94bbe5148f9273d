use clap::{Parser, Subcommand};

use crate::suggest::MatchMode;

/// souschef — credential-guarded relay for an LLM completion API,
/// plus a recipe suggestion client.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Listen address (e.g. ":8787" or "0.0.0.0:8787")
    #[arg(long, default_value = ":8787", env = "ADDR")]
    pub addr: String,

    /// Log format: "text" or "json"
    #[arg(long, default_value = "text", env = "LOG_FORMAT")]
    pub log_format: String,

    /// Anthropic API key (kept server-side, never sent to callers)
    #[arg(long, env = "ANTHROPIC_API_KEY")]
    pub api_key: Option<String>,

    /// Upstream completion API base URL
    #[arg(
        long,
        default_value = "https://api.anthropic.com",
        env = "ANTHROPIC_BASE_URL"
    )]
    pub upstream_base_url: String,

    /// Emit permissive CORS headers on every response
    #[arg(
        long,
        default_value_t = true,
        env = "CORS_ENABLED",
        action = clap::ArgAction::Set
    )]
    pub cors_enabled: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the relay server (the default when no subcommand is given)
    Serve,

    /// One-shot recipe search against a relay endpoint
    Suggest {
        /// Comma-separated ingredient list
        #[arg(long)]
        ingredients: String,

        /// Matching mode: exact, few, or flexible
        #[arg(long, value_enum, default_value = "exact")]
        mode: MatchMode,

        /// Relay endpoint to send the completion request to
        #[arg(long, default_value = "http://localhost:8787/api/complete")]
        endpoint: String,

        /// Model to request from the completion API
        #[arg(long, default_value = "claude-sonnet-4-20250514")]
        model: String,
    },
}

/// Parse a comma-separated ingredient list, trimming whitespace and filtering empties.
pub fn parse_ingredient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ingredient_list_trims_whitespace() {
        assert_eq!(
            parse_ingredient_list("tomato, egg ,basil"),
            vec!["tomato", "egg", "basil"]
        );
    }

    #[test]
    fn test_parse_ingredient_list_filters_empties() {
        assert_eq!(
            parse_ingredient_list("tomato,, ,egg,"),
            vec!["tomato", "egg"]
        );
    }

    #[test]
    fn test_parse_ingredient_list_all_empty() {
        let result = parse_ingredient_list(", ,");
        assert!(result.is_empty());
    }
}
