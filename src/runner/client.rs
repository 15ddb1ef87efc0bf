use crate::config::RetryConfig;
use crate::error::GenerationError;
use crate::provider::Generator;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::retry::retry_with_backoff;

/// Transport resilience around a [`Generator`]: rate-limit retries with
/// exponential backoff, then a cooperative pause after each success.
#[derive(Clone)]
pub struct GenerationClient {
    generator: Arc<dyn Generator>,
    retry: RetryConfig,
}

impl GenerationClient {
    pub fn new(generator: Arc<dyn Generator>, retry: RetryConfig) -> Self {
        Self { generator, retry }
    }

    pub async fn call(
        &self,
        prompt: &str,
        temperature: f32,
        delay_after: Duration,
    ) -> Result<String, GenerationError> {
        debug!(
            "Calling {} with {} byte prompt at temperature {}",
            self.generator.name(),
            prompt.len(),
            temperature
        );

        let generator = self.generator.clone();
        let text = retry_with_backoff(&self.retry, GenerationError::is_rate_limited, || {
            let generator = generator.clone();
            async move { generator.generate(prompt, temperature).await }
        })
        .await?;

        if delay_after > Duration::ZERO {
            sleep(delay_after).await;
        }

        Ok(text)
    }
}
