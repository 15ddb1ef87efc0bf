use crate::error::ParseError;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Recover a list of JSON objects from raw model output.
///
/// Shapes are tried in priority order:
/// 1. a JSON array found anywhere in the text (bracket-matched),
/// 2. a single JSON object, wrapped into a one-element list,
/// 3. several concatenated JSON objects, brace-matched one by one.
pub fn parse_model_output(raw: &str) -> Result<Vec<Value>, ParseError> {
    let text = unwrap_cli_envelope(raw);
    let cleaned = strip_code_fence(&text);

    if let Some(items) = parse_array(cleaned) {
        return Ok(items);
    }

    if cleaned.starts_with('{') && cleaned.ends_with('}') {
        if let Ok(obj @ Value::Object(_)) = serde_json::from_str::<Value>(cleaned) {
            return Ok(vec![obj]);
        }
    }

    let objects = collect_objects(cleaned);
    if !objects.is_empty() {
        return Ok(objects);
    }

    tracing::debug!(
        "Unparseable model output: {}...",
        raw.chars().take(200).collect::<String>()
    );
    Err(ParseError::NoObjects)
}

/// The Claude CLI wraps the model's reply in `{"result": "...", ...}`.
fn unwrap_cli_envelope(raw: &str) -> String {
    #[derive(Deserialize)]
    struct CliOutput {
        result: String,
    }

    match serde_json::from_str::<CliOutput>(raw.trim()) {
        Ok(out) => out.result,
        Err(_) => raw.to_string(),
    }
}

fn strip_code_fence(s: &str) -> &str {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = FENCE.get_or_init(|| Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").ok());

    re.as_ref()
        .and_then(|re| re.captures(s))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| s.trim())
}

/// First bracket-matched array that parses and holds at least one object.
fn parse_array(s: &str) -> Option<Vec<Value>> {
    let mut pos = 0;

    while let Some(offset) = s[pos..].find('[') {
        let start = pos + offset;
        pos = start + 1;

        let Some(end) = matching_close(s, start, '[', ']') else {
            continue;
        };

        match serde_json::from_str::<Value>(&s[start..=end]) {
            Ok(Value::Array(items)) if items.iter().any(Value::is_object) => return Some(items),
            Ok(_) => {}
            Err(e) => tracing::debug!("Bracket-matched array is not valid JSON: {}", e),
        }
    }

    None
}

fn collect_objects(s: &str) -> Vec<Value> {
    let mut objects = Vec::new();
    let mut pos = 0;

    while let Some(offset) = s[pos..].find('{') {
        let start = pos + offset;
        let Some(end) = matching_close(s, start, '{', '}') else {
            break;
        };

        if let Ok(obj @ Value::Object(_)) = serde_json::from_str::<Value>(&s[start..=end]) {
            objects.push(obj);
        }
        pos = end + 1;
    }

    objects
}

/// Byte index of the delimiter closing the one at `start`, skipping string contents.
fn matching_close(s: &str, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_after_bracketed_prose() {
        let raw = r#"Note [draft: {"x": 1}] final answer: [{"text": "a"}, {"text": "b"}]"#;
        let items = parse_model_output(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["text"], "a");
        assert_eq!(items[1]["text"], "b");
    }

    #[test]
    fn test_parse_plain_array() {
        let raw = r#"[{"text": "a", "significance_y": 0.5}, {"text": "b", "significance_y": 0.2}]"#;
        let items = parse_model_output(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["text"], "b");
    }

    #[test]
    fn test_parse_array_with_prose_and_brackets_in_strings() {
        let raw = r#"Sure! Here you go:
[{"text": "Costs [and benefits] differ", "significance_y": 0.7}]
Let me know if you need more."#;
        let items = parse_model_output(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["text"], "Costs [and benefits] differ");
    }

    #[test]
    fn test_parse_markdown_fenced_object() {
        let raw = "```json\n{\"text\": \"solo\", \"significance_y\": 0.3}\n```";
        let items = parse_model_output(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["text"], "solo");
    }

    #[test]
    fn test_parse_concatenated_objects() {
        let raw = r#"{"text": "one", "significance_y": 0.1}{"text": "two", "significance_y": 0.2}
{"text": "three", "significance_y": 0.3}"#;
        let items = parse_model_output(raw).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2]["text"], "three");
    }

    #[test]
    fn test_parse_cli_envelope() {
        let raw = r#"{"type": "result", "result": "[{\"text\": \"wrapped\", \"significance_y\": 0.9}]", "session_id": "abc"}"#;
        let items = parse_model_output(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["text"], "wrapped");
    }

    #[test]
    fn test_broken_array_falls_back_to_objects() {
        let raw = r#"[{"text": "ok", "significance_y": 0.4}, {"text": "cut"#;
        let items = parse_model_output(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["text"], "ok");
    }

    #[test]
    fn test_unparseable_output() {
        assert_eq!(
            parse_model_output("I cannot help with that."),
            Err(ParseError::NoObjects)
        );
        assert_eq!(parse_model_output("[]"), Err(ParseError::NoObjects));
        assert_eq!(parse_model_output(""), Err(ParseError::NoObjects));
    }
}
