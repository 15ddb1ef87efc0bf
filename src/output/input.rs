use crate::error::InputError;
use crate::scaffold::perspective_count;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

const DEFAULT_SIGNIFICANCE: f64 = 0.7;

/// The claim to generate perspectives for, as produced by the upstream
/// classifier stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInput {
    pub statement: String,
    /// Summary of the source material, passed to band prompts when present
    pub context: Option<String>,
    /// Clamped to `[0, 1]`
    pub significance: f64,
}

#[derive(Deserialize)]
struct RawInput {
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    significance_score: Option<f64>,
}

impl RunInput {
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path).map_err(|e| InputError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let raw: RawInput = serde_json::from_str(&content).map_err(|e| InputError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawInput) -> Result<Self, InputError> {
        let statement = [raw.input, raw.topic]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
            .ok_or(InputError::MissingStatement)?;

        let context = raw
            .text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let significance = match raw.significance_score {
            None => DEFAULT_SIGNIFICANCE,
            Some(s) if s.is_nan() => {
                warn!("significance_score is NaN, using {}", DEFAULT_SIGNIFICANCE);
                DEFAULT_SIGNIFICANCE
            }
            Some(s) if !(0.0..=1.0).contains(&s) => {
                let clamped = s.clamp(0.0, 1.0);
                warn!("significance_score {} outside [0, 1], clamped to {}", s, clamped);
                clamped
            }
            Some(s) => s,
        };

        Ok(Self {
            statement,
            context,
            significance,
        })
    }

    pub fn perspective_count(&self) -> usize {
        perspective_count(self.significance)
    }
}
