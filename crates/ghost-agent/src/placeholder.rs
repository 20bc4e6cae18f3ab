//! Substitution of `{result_of_action_N}` tokens with earlier results.
//!
//! Resolution is single-pass and left to right: action `i` only ever sees
//! results `0..i`. A token whose index has no result yet stays literal text.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::types::{ActionResult, Args};

/// Argument names whose capabilities only accept text.
pub const STRING_PARAMS: &[&str] = &[
    "body",
    "message",
    "text",
    "content",
    "subject",
    "caption",
    "description",
];

/// Mapping fields tried, in order, when a structured result is used as text.
const TEXT_FIELDS: &[&str] = &["text", "content", "body", "result", "output", "data"];

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{result_of_action_(\d+)\}").expect("valid placeholder regex"))
}

/// Resolve every argument of an action against the results produced so far.
///
/// A whole-value placeholder bound to a string-like parameter (see
/// [`STRING_PARAMS`]) is coerced to text even when the result is a mapping.
pub fn resolve_args(args: &Args, prior: &[ActionResult]) -> Args {
    args.iter()
        .map(|(name, raw)| {
            let mut resolved = resolve_value(raw, prior);
            if resolved.is_object()
                && raw.as_str().and_then(whole_placeholder).is_some()
                && STRING_PARAMS.contains(&name.as_str())
            {
                resolved = Value::String(text_projection(&resolved));
            }
            (name.clone(), resolved)
        })
        .collect()
}

/// Resolve placeholders inside one value, recursing through arrays and objects.
pub fn resolve_value(value: &Value, prior: &[ActionResult]) -> Value {
    match value {
        Value::String(s) => resolve_str(s, prior),
        Value::Array(items) => Value::Array(items.iter().map(|v| resolve_value(v, prior)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, prior)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn resolve_str(s: &str, prior: &[ActionResult]) -> Value {
    if let Some(index) = whole_placeholder(s) {
        if let Some(result) = prior.get(index) {
            return result.value().clone();
        }
        return Value::String(s.to_string());
    }

    let replaced = placeholder_regex().replace_all(s, |caps: &Captures<'_>| {
        let result = caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|index| prior.get(index));
        match result {
            Some(result) => text_projection(result.value()),
            None => caps[0].to_string(),
        }
    });
    Value::String(replaced.into_owned())
}

/// Index of the placeholder if the trimmed string is exactly one token.
fn whole_placeholder(s: &str) -> Option<usize> {
    let trimmed = s.trim();
    let caps = placeholder_regex().captures(trimmed)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 && whole.end() == trimmed.len() {
        caps[1].parse().ok()
    } else {
        None
    }
}

/// Render a result as text for embedding in a larger string.
///
/// Strings are used verbatim. Mappings use the first string-valued field among
/// `text, content, body, result, output, data`, else their JSON rendering.
/// `null` renders as an empty string.
pub fn text_projection(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(map) => TEXT_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(values: Vec<Value>) -> Vec<ActionResult> {
        values.into_iter().map(ActionResult::new).collect()
    }

    fn args(value: Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_whole_placeholder_preserves_structure() {
        let prior = results(vec![json!({"rows": [1, 2], "text": "two rows"})]);
        let resolved = resolve_value(&json!("{result_of_action_0}"), &prior);
        assert_eq!(resolved, json!({"rows": [1, 2], "text": "two rows"}));
    }

    #[test]
    fn test_whole_placeholder_ignores_surrounding_whitespace() {
        let prior = results(vec![json!([1, 2, 3])]);
        let resolved = resolve_value(&json!("  {result_of_action_0} \n"), &prior);
        assert_eq!(resolved, json!([1, 2, 3]));
    }

    #[test]
    fn test_embedded_placeholder_yields_string() {
        let prior = results(vec![json!({"text": "42 files"})]);
        let resolved = resolve_value(&json!("Found: {result_of_action_0}."), &prior);
        assert_eq!(resolved, json!("Found: 42 files."));
    }

    #[test]
    fn test_embedded_projection_field_priority() {
        let prior = results(vec![json!({"data": "d", "output": "o", "content": "c"})]);
        let resolved = resolve_value(&json!("x {result_of_action_0}"), &prior);
        assert_eq!(resolved, json!("x c"));
    }

    #[test]
    fn test_embedded_projection_skips_non_string_fields() {
        let prior = results(vec![json!({"text": 5, "body": "b"})]);
        let resolved = resolve_value(&json!("x {result_of_action_0}"), &prior);
        assert_eq!(resolved, json!("x b"));
    }

    #[test]
    fn test_embedded_projection_falls_back_to_json() {
        let prior = results(vec![json!({"count": 3})]);
        let resolved = resolve_value(&json!("got {result_of_action_0}"), &prior);
        assert_eq!(resolved, json!(r#"got {"count":3}"#));
    }

    #[test]
    fn test_embedded_scalars() {
        let prior = results(vec![json!(7), json!(null), json!(true)]);
        let resolved = resolve_value(
            &json!("{result_of_action_0}|{result_of_action_1}|{result_of_action_2}"),
            &prior,
        );
        assert_eq!(resolved, json!("7||true"));
    }

    #[test]
    fn test_multiple_placeholders_substituted_independently() {
        let prior = results(vec![json!("alpha"), json!({"text": "beta"})]);
        let resolved = resolve_value(
            &json!("{result_of_action_1} then {result_of_action_0} then {result_of_action_1}"),
            &prior,
        );
        assert_eq!(resolved, json!("beta then alpha then beta"));
    }

    #[test]
    fn test_unproduced_index_stays_literal() {
        let prior = results(vec![json!("only one")]);
        assert_eq!(
            resolve_value(&json!("{result_of_action_1}"), &prior),
            json!("{result_of_action_1}")
        );
        assert_eq!(
            resolve_value(&json!("a {result_of_action_5} b {result_of_action_0}"), &prior),
            json!("a {result_of_action_5} b only one")
        );
    }

    #[test]
    fn test_no_prior_results_leaves_everything_literal() {
        let resolved = resolve_value(&json!("{result_of_action_0}"), &[]);
        assert_eq!(resolved, json!("{result_of_action_0}"));
    }

    #[test]
    fn test_nested_structures_resolved_keys_unchanged() {
        let prior = results(vec![json!("a.txt")]);
        let resolved = resolve_value(
            &json!({
                "{result_of_action_0}": ["{result_of_action_0}", 1, {"inner": "x {result_of_action_0}"}]
            }),
            &prior,
        );
        assert_eq!(
            resolved,
            json!({"{result_of_action_0}": ["a.txt", 1, {"inner": "x a.txt"}]})
        );
    }

    #[test]
    fn test_non_string_scalars_untouched() {
        let prior = results(vec![json!("x")]);
        assert_eq!(resolve_value(&json!(3.5), &prior), json!(3.5));
        assert_eq!(resolve_value(&json!(false), &prior), json!(false));
    }

    #[test]
    fn test_string_param_override_coerces_mapping() {
        let prior = results(vec![json!({"text": "Hi"})]);
        let resolved = resolve_args(&args(json!({"body": "{result_of_action_0}"})), &prior);
        assert_eq!(resolved["body"], json!("Hi"));
    }

    #[test]
    fn test_non_string_param_keeps_mapping() {
        let prior = results(vec![json!({"text": "Hi"})]);
        let resolved = resolve_args(&args(json!({"data": "{result_of_action_0}"})), &prior);
        assert_eq!(resolved["data"], json!({"text": "Hi"}));
    }

    #[test]
    fn test_string_param_override_uses_json_fallback() {
        let prior = results(vec![json!({"rows": 2})]);
        let resolved = resolve_args(&args(json!({"message": "{result_of_action_0}"})), &prior);
        assert_eq!(resolved["message"], json!(r#"{"rows":2}"#));
    }

    #[test]
    fn test_string_param_keeps_arrays() {
        let prior = results(vec![json!(["a", "b"])]);
        let resolved = resolve_args(&args(json!({"text": "{result_of_action_0}"})), &prior);
        assert_eq!(resolved["text"], json!(["a", "b"]));
    }

    #[test]
    fn test_resolve_args_leaves_plain_values() {
        let resolved = resolve_args(&args(json!({"to": "a@b.c", "count": 2})), &[]);
        assert_eq!(resolved["to"], json!("a@b.c"));
        assert_eq!(resolved["count"], json!(2));
    }
}
