//! Folds executed steps into the final user-facing digest.

use serde_json::Value;

use ghost_core::config::AgentConfig;

use crate::types::{truncate_chars, StepRecord};

/// Mapping fields shown in the digest, in priority order.
const DIGEST_FIELDS: &[&str] = &["text", "output", "result", "data"];

#[derive(Debug, Clone, Copy)]
pub struct Summarizer {
    item_chars: usize,
    scalar_chars: usize,
}

impl Summarizer {
    pub fn new(item_chars: usize, scalar_chars: usize) -> Self {
        Self {
            item_chars,
            scalar_chars,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.summary_item_chars, config.summary_scalar_chars)
    }

    /// Build the digest. Steps already surfaced to the user, failed steps and
    /// file results are skipped; the rest are joined by blank lines.
    pub fn digest(&self, steps: &[StepRecord]) -> String {
        steps
            .iter()
            .filter(|step| !step.delivered)
            .filter_map(|step| self.part(step.result.value()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn part(&self, value: &Value) -> Option<String> {
        match value {
            Value::Object(map) => {
                if matches!(map.get("success"), Some(Value::Bool(false))) || map.contains_key("file_path") {
                    return None;
                }
                let shown = DIGEST_FIELDS
                    .iter()
                    .filter_map(|field| map.get(*field))
                    .find(|v| is_truthy(v))?;
                let text = match shown {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if text.trim().is_empty() {
                    return None;
                }
                Some(truncate_chars(&text, self.item_chars))
            }
            Value::String(s) if !s.trim().is_empty() => Some(truncate_chars(s, self.scalar_chars)),
            Value::Number(n) => Some(truncate_chars(&n.to_string(), self.scalar_chars)),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionResult;
    use serde_json::json;

    fn step(value: Value, delivered: bool) -> StepRecord {
        StepRecord {
            module: "m".to_string(),
            function: "f".to_string(),
            result: ActionResult::new(value),
            delivered,
        }
    }

    #[test]
    fn test_joins_with_blank_lines() {
        let steps = vec![
            step(json!({"text": "CPU 12%"}), false),
            step(json!("done"), false),
            step(json!(42), false),
        ];
        assert_eq!(Summarizer::default().digest(&steps), "CPU 12%\n\ndone\n\n42");
    }

    #[test]
    fn test_field_priority() {
        let steps = vec![step(json!({"data": "d", "output": "o", "text": ""}), false)];
        assert_eq!(Summarizer::default().digest(&steps), "o");
    }

    #[test]
    fn test_skips_failures_files_and_delivered() {
        let steps = vec![
            step(json!({"success": false, "error": "x", "text": "hidden"}), false),
            step(json!({"file_path": "/tmp/a.png", "text": "hidden"}), false),
            step(json!("already sent"), true),
            step(json!(null), false),
            step(json!([1, 2]), false),
            step(json!({"success": true}), false),
            step(json!("   "), false),
        ];
        assert_eq!(Summarizer::default().digest(&steps), "");
    }

    #[test]
    fn test_non_string_field_rendered_as_json() {
        let steps = vec![step(json!({"data": {"rows": 3}}), false)];
        assert_eq!(Summarizer::default().digest(&steps), r#"{"rows":3}"#);
    }

    #[test]
    fn test_caps() {
        let summarizer = Summarizer::new(5, 3);
        let steps = vec![
            step(json!({"text": "abcdefgh"}), false),
            step(json!("wxyz"), false),
        ];
        assert_eq!(summarizer.digest(&steps), "abcde\n\nwxy");
    }
}
