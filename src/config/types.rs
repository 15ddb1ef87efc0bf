use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Run input JSON (`input`/`topic`, `significance_score`)
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Where the full perspective set is written
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Directory for the stratified leftist/common/rightist files
    #[serde(default = "default_reduce_dir")]
    pub reduce_dir: PathBuf,

    #[serde(default)]
    pub provider: ProviderKind,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub repair: RepairConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    Http,
    /// Local `claude` CLI in print mode
    ClaudeCli,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Http => write!(f, "http"),
            ProviderKind::ClaudeCli => write!(f, "claude_cli"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" | "openai" => Ok(ProviderKind::Http),
            "claude_cli" | "claude" => Ok(ProviderKind::ClaudeCli),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub claude_cli: ClaudeCliConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct HttpConfig {
    /// Base URL; `/chat/completions` is appended
    #[serde(default = "default_http_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_http_model")]
    pub model: String,

    /// Name of the environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: default_http_endpoint(),
            model: default_http_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ClaudeCliConfig {
    #[serde(default = "default_claude_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_claude_model")]
    pub model: String,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            binary: default_claude_binary(),
            model: default_claude_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct GenerationConfig {
    /// Sampling temperature for band generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Temperature for the single retry after unparseable output
    #[serde(default = "default_parse_retry_temperature")]
    pub parse_retry_temperature: f32,

    #[serde(default = "default_repair_temperature")]
    pub repair_temperature: f32,

    /// Pause after each successful band call, sharing the service quota
    #[serde(default = "default_delay_after_ms")]
    pub delay_after_ms: u64,

    #[serde(default = "default_repair_delay_after_ms")]
    pub repair_delay_after_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            parse_retry_temperature: default_parse_retry_temperature(),
            repair_temperature: default_repair_temperature(),
            delay_after_ms: default_delay_after_ms(),
            repair_delay_after_ms: default_repair_delay_after_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RepairConfig {
    /// Maximum slots sent in one repair call
    #[serde(default = "default_repair_batch_size")]
    pub batch_size: usize,

    /// Maximum existing texts listed in a repair prompt
    #[serde(default = "default_avoid_limit")]
    pub avoid_limit: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            batch_size: default_repair_batch_size(),
            avoid_limit: default_avoid_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PromptConfig {
    /// Most recent texts quoted back in band prompts
    #[serde(default = "default_recent_texts")]
    pub recent_texts: usize,

    /// Cap on the existing-perspective count reported to the model
    #[serde(default = "default_existing_cap")]
    pub existing_cap: usize,

    /// Extra instructions appended to every band prompt
    #[serde(default)]
    pub suffix: Option<String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            recent_texts: default_recent_texts(),
            existing_cap: default_existing_cap(),
            suffix: None,
        }
    }
}
