mod claude;
mod http;

pub use claude::ClaudeCliGenerator;
pub use http::HttpGenerator;

use crate::config::{Config, ProviderKind};
use crate::error::GenerationError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A text-generation backend: prompt in, raw text out.
///
/// Implementations report rate limiting as [`GenerationError::RateLimited`] so
/// the caller can tell it apart from other failures.
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError>;
}

/// Markers that backends embed in error text when the shared quota is exhausted.
pub(crate) fn looks_rate_limited(text: &str) -> bool {
    let lower = text.to_lowercase();
    text.contains("429") || text.contains("RESOURCE_EXHAUSTED") || lower.contains("rate limit")
}

/// Create the generator selected by the config
pub fn create_generator(config: &Config) -> Result<Arc<dyn Generator>, GenerationError> {
    let timeout = Duration::from_secs(config.timeout_sec);

    match config.provider {
        ProviderKind::Http => {
            let http = &config.providers.http;
            let api_key = std::env::var(&http.api_key_env).ok();
            if api_key.is_none() {
                tracing::warn!(
                    "{} not set, calling {} without authorization",
                    http.api_key_env,
                    http.endpoint
                );
            }
            Ok(Arc::new(HttpGenerator::with_config(
                &http.endpoint,
                &http.model,
                api_key,
                timeout,
                http.max_tokens,
                http.top_p,
            )?))
        }
        ProviderKind::ClaudeCli => Ok(Arc::new(ClaudeCliGenerator {
            binary: config.providers.claude_cli.binary.clone(),
            model: config.providers.claude_cli.model.clone(),
            timeout,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_markers() {
        assert!(looks_rate_limited("HTTP 429 Too Many Requests"));
        assert!(looks_rate_limited("status: RESOURCE_EXHAUSTED"));
        assert!(looks_rate_limited("Rate limit reached for requests"));
        assert!(!looks_rate_limited("permission denied"));
    }
}
