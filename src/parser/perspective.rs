use crate::scaffold::{round4, Band};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated, final perspective.
///
/// Deserialization is lenient so that hand-edited or partially written run
/// outputs can still be reduced: a missing `bias_x` becomes `0.5`, a missing or
/// out-of-range `significance_y` is clamped, and a missing colour is derived
/// from the bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PerspectiveRecord")]
pub struct Perspective {
    #[serde(rename = "color")]
    pub band: Band,
    pub bias_x: f64,
    pub significance_y: f64,
    pub text: String,
}

#[derive(Deserialize)]
struct PerspectiveRecord {
    #[serde(default, alias = "band")]
    color: Option<String>,
    #[serde(default)]
    bias_x: Option<f64>,
    #[serde(default)]
    significance_y: Option<f64>,
    #[serde(default)]
    text: String,
}

impl From<PerspectiveRecord> for Perspective {
    fn from(record: PerspectiveRecord) -> Self {
        let bias_x = record
            .bias_x
            .filter(|b| b.is_finite())
            .map(|b| b.clamp(0.0, 1.0))
            .unwrap_or(0.5);
        let significance_y = record
            .significance_y
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 1.0))
            .unwrap_or(0.5);
        let band = record
            .color
            .and_then(|c| c.parse().ok())
            .unwrap_or_else(|| Band::from_bias(bias_x));

        Perspective {
            band,
            bias_x,
            significance_y,
            text: record.text,
        }
    }
}

/// Raw, unvalidated model output attributed to a slot by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerspectiveCandidate {
    pub text: String,

    /// Parsed significance, `None` when absent or not numeric.
    pub significance_y: Option<f64>,

    /// Significance exactly as the model wrote it, echoed back in repair prompts.
    pub raw_significance: Value,
}

impl PerspectiveCandidate {
    /// Interpret one parsed JSON value as a candidate.
    ///
    /// Non-object values produce an empty candidate, which the validator routes
    /// to repair.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let text = obj
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();

        let raw_significance = obj
            .get("significance_y")
            .or_else(|| obj.get("significance"))
            .cloned()
            .unwrap_or(Value::Null);

        Self {
            text,
            significance_y: parse_significance(&raw_significance),
            raw_significance,
        }
    }

    /// Significance if it lies within `[0, 1]`, rounded for output.
    pub fn valid_significance(&self) -> Option<f64> {
        self.significance_y
            .filter(|s| (0.0..=1.0).contains(s))
            .map(round4)
    }
}

fn parse_significance(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|s| s.is_finite())
}
