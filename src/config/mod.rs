mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::path::Path;

const PROMPT_SUFFIX_ENV: &str = "PROMPT_SUFFIX";

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            input: default_input(),
            output: default_output(),
            reduce_dir: default_reduce_dir(),
            provider: ProviderKind::default(),
            providers: ProvidersConfig::default(),
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
            repair: RepairConfig::default(),
            prompt: PromptConfig::default(),
            timeout_sec: default_timeout_sec(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            tracing::info!("Loading config from {:?}", path);
            Self::load(path)?
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Self::default()
        };

        if config.prompt.suffix.is_none() {
            config.prompt.suffix = std::env::var(PROMPT_SUFFIX_ENV)
                .ok()
                .filter(|s| !s.trim().is_empty());
        }

        Ok(config)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        let temperatures = [
            ("generation.temperature", self.generation.temperature),
            (
                "generation.parse_retry_temperature",
                self.generation.parse_retry_temperature,
            ),
            (
                "generation.repair_temperature",
                self.generation.repair_temperature,
            ),
        ];
        for (field, value) in temperatures {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{} is outside [0, 2]", value),
                });
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.repair.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "repair.batch_size",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
