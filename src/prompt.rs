//! Prompt payloads for band generation and repair.
//!
//! Both prompts are JSON documents: the structured fields carry the slots to
//! fill, and `instructions` carries the embedded markdown template.

use crate::config::PromptConfig;
use crate::runner::{ExistingTexts, RepairItem};
use crate::scaffold::{Band, PerspectiveSlot};
use serde_json::json;

const BAND_TEMPLATE: &str = include_str!("../prompts/band.md");
const REPAIR_TEMPLATE: &str = include_str!("../prompts/repair.md");

/// Build the generation prompt for one band's slots.
pub fn build_band_prompt(
    statement: &str,
    context: Option<&str>,
    band: Band,
    slots: &[PerspectiveSlot],
    existing: &ExistingTexts,
    config: &PromptConfig,
) -> String {
    let first_bias = slots.first().map(|s| s.bias_x).unwrap_or(0.5);
    let last_bias = slots.last().map(|s| s.bias_x).unwrap_or(first_bias);
    let second_bias = slots.get(1).map(|s| s.bias_x).unwrap_or(first_bias);

    let bias_range = if slots.len() > 1 {
        format!("{:.3} to {:.3}", first_bias, last_bias)
    } else {
        format!("{:.3}", first_bias)
    };

    let mut instructions = BAND_TEMPLATE
        .replace("{{COUNT}}", &slots.len().to_string())
        .replace("{{BAND}}", band.as_str())
        .replace("{{FIRST_BIAS}}", &first_bias.to_string())
        .replace("{{SECOND_BIAS}}", &second_bias.to_string())
        // User text goes in last so placeholders inside it stay literal
        .replace("{{STATEMENT}}", statement);

    let existing_count = existing.len().min(config.existing_cap);
    if !existing.is_empty() && config.recent_texts > 0 {
        instructions.push_str(&format!(
            "\nIMPORTANT: DO NOT repeat any of these {} existing perspectives:\n",
            existing_count
        ));
        for text in existing.recent(config.recent_texts) {
            instructions.push_str(&format!("- \"{}\"\n", text));
        }
    }

    if let Some(suffix) = config.suffix.as_deref().map(str::trim) {
        if !suffix.is_empty() {
            instructions.push('\n');
            instructions.push_str(suffix);
        }
    }

    let mut payload = json!({
        "input": statement,
        "color": band,
        "bias_range": bias_range,
        "required_count": slots.len(),
        "items": slots.iter().map(|s| json!({"bias_x": s.bias_x})).collect::<Vec<_>>(),
        "existing_perspective_count": existing_count,
        "instructions": instructions,
    });
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        payload["context"] = json!(context);
    }

    payload.to_string()
}

/// Build the repair prompt for one batch of failed slots.
pub fn build_repair_prompt(
    statement: &str,
    batch: &[RepairItem],
    existing: &ExistingTexts,
    avoid_limit: usize,
) -> String {
    let repair_items: Vec<_> = batch
        .iter()
        .map(|item| {
            json!({
                "color": item.slot.band,
                "bias_x": item.slot.bias_x,
                "current_text": item.candidate.text,
                "current_significance": item.candidate.raw_significance,
            })
        })
        .collect();

    let instructions = REPAIR_TEMPLATE.replace("{{COUNT}}", &batch.len().to_string());

    json!({
        "input": statement,
        "repair_items": repair_items,
        "avoid_texts": existing.recent(avoid_limit),
        "instructions": instructions,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PerspectiveCandidate;
    use crate::scaffold::build_scaffold;
    use serde_json::Value;

    #[test]
    fn test_band_prompt_lists_slots_and_recent_texts() {
        let slots = build_scaffold(14).unwrap();
        let red: Vec<_> = slots.iter().filter(|s| s.band == Band::Red).copied().collect();

        let mut existing = ExistingTexts::new();
        for i in 0..15 {
            existing.insert(&format!("text {}", i));
        }

        let config = PromptConfig {
            suffix: Some("Be concise.".to_string()),
            ..PromptConfig::default()
        };
        let prompt = build_band_prompt(
            "Cities should ban cars",
            Some("Summary of the claim"),
            Band::Red,
            &red,
            &existing,
            &config,
        );
        let payload: Value = serde_json::from_str(&prompt).unwrap();

        assert_eq!(payload["color"], "red");
        assert_eq!(payload["required_count"], 2);
        assert_eq!(payload["items"].as_array().unwrap().len(), 2);
        assert_eq!(payload["existing_perspective_count"], 15);
        assert_eq!(payload["context"], "Summary of the claim");

        let instructions = payload["instructions"].as_str().unwrap();
        assert!(instructions.contains("EXACTLY 2 unique red perspectives"));
        assert!(instructions.contains("\"text 14\""));
        assert!(instructions.contains("\"text 5\""));
        assert!(!instructions.contains("\"text 4\""));
        assert!(instructions.ends_with("Be concise."));
    }

    #[test]
    fn test_band_prompt_without_history() {
        let slots = build_scaffold(7).unwrap();
        let prompt = build_band_prompt(
            "s",
            None,
            Band::Green,
            &slots[3..4],
            &ExistingTexts::new(),
            &PromptConfig::default(),
        );
        let payload: Value = serde_json::from_str(&prompt).unwrap();
        assert_eq!(payload["bias_range"], "0.500");
        assert!(payload.get("context").is_none());
        assert!(!payload["instructions"]
            .as_str()
            .unwrap()
            .contains("DO NOT repeat"));
    }

    #[test]
    fn test_statement_placeholders_stay_literal() {
        let slots = build_scaffold(14).unwrap();
        let prompt = build_band_prompt(
            "Is {{FIRST_BIAS}} or {{SECOND_BIAS}} the answer?",
            None,
            Band::Red,
            &slots[..2],
            &ExistingTexts::new(),
            &PromptConfig::default(),
        );
        let payload: Value = serde_json::from_str(&prompt).unwrap();
        let instructions = payload["instructions"].as_str().unwrap();
        assert!(instructions.contains("Is {{FIRST_BIAS}} or {{SECOND_BIAS}} the answer?"));
    }

    #[test]
    fn test_repair_prompt_caps_avoid_list() {
        let slots = build_scaffold(7).unwrap();
        let batch = vec![RepairItem {
            position: 0,
            slot: slots[0],
            candidate: PerspectiveCandidate {
                text: "dup".to_string(),
                significance_y: None,
                raw_significance: Value::String("n/a".to_string()),
            },
        }];

        let mut existing = ExistingTexts::new();
        for i in 0..150 {
            existing.insert(&format!("t{}", i));
        }

        let prompt = build_repair_prompt("s", &batch, &existing, 100);
        let payload: Value = serde_json::from_str(&prompt).unwrap();
        assert_eq!(payload["avoid_texts"].as_array().unwrap().len(), 100);
        assert_eq!(payload["repair_items"][0]["current_text"], "dup");
        assert_eq!(payload["repair_items"][0]["current_significance"], "n/a");
        assert!(payload["instructions"]
            .as_str()
            .unwrap()
            .contains("Fix these 1 perspectives"));
    }
}
