use super::{looks_rate_limited, Generator};
use crate::error::GenerationError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;

/// Generates through the `claude` CLI in print mode.
///
/// The CLI has no temperature flag; the requested temperature is only logged.
pub struct ClaudeCliGenerator {
    pub binary: PathBuf,
    pub model: String,
    pub timeout: Duration,
}

#[async_trait]
impl Generator for ClaudeCliGenerator {
    fn name(&self) -> &'static str {
        "claude_cli"
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        // Use string for PATH lookup if not an absolute/relative path
        let binary_str = self.binary.to_string_lossy();
        let mut cmd = if binary_str.contains('/') || binary_str.contains('\\') {
            Command::new(&self.binary)
        } else {
            Command::new(binary_str.as_ref())
        };

        // Ensure subscription auth is used (not API key)
        cmd.env_remove("ANTHROPIC_API_KEY");

        cmd.arg("-p")
            .arg(prompt)
            .arg("--model")
            .arg(&self.model)
            .arg("--output-format")
            .arg("json");

        tracing::debug!(
            "claude_cli: {} byte prompt (temperature {} not forwarded)",
            prompt.len(),
            temperature
        );

        let output = tokio_timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))?
            .map_err(GenerationError::Io)?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            if looks_rate_limited(&stderr) || looks_rate_limited(&stdout) {
                return Err(GenerationError::RateLimited(stderr));
            }
            return Err(GenerationError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        if stdout.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(stdout)
    }
}
