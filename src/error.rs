use crate::scaffold::Band;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Malformed run input. Fatal before any generation call is made.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read input file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse input file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Input must contain a non-empty 'input' or 'topic' field with the statement")]
    MissingStatement,
}

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Perspective count must be > 0 (got {0})")]
    InvalidCount(usize),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Rate limited by generation service: {0}")]
    RateLimited(String),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Process failed with exit code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generation service returned an empty response")]
    EmptyResponse,

    #[error("Generator misconfigured: {0}")]
    Config(String),
}

impl GenerationError {
    /// Rate-limit / resource-exhaustion signals are the only retryable failures.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GenerationError::RateLimited(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Could not parse any JSON objects from model output")]
    NoObjects,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Scaffold error: {0}")]
    Scaffold(#[from] ScaffoldError),

    #[error("Generation failed for {band} band: {source}")]
    Generation {
        band: Band,
        #[source]
        source: GenerationError,
    },

    #[error("Output for {band} band could not be parsed after retry: {source}")]
    Parse {
        band: Band,
        #[source]
        source: ParseError,
    },

    #[error("Run cancelled after {completed_bands} completed bands")]
    Cancelled { completed_bands: usize },
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
