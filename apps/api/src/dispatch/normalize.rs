//! Response normalization — turns a model's free-form text into a JSON object.
//!
//! Models are asked for bare JSON but still wrap it in markdown fences or
//! prepend chatter. Normalization strips fences, cuts the span from the first
//! `{` to the last `}`, and parses it strictly. There is no repair step:
//! anything that fails here is a provider failure and the dispatcher fails over.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?i)```(?:json)?").expect("valid fence regex");
    static ref JSON_SPAN: Regex = Regex::new(r"(?s)\{.*\}").expect("valid span regex");
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoJsonObject { raw_text: String },

    #[error("invalid JSON in model output: {source}")]
    InvalidJson {
        raw_text: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model output does not match the expected schema: {source}")]
    Schema {
        raw_text: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    pub fn raw_text(&self) -> &str {
        match self {
            ParseError::NoJsonObject { raw_text }
            | ParseError::InvalidJson { raw_text, .. }
            | ParseError::Schema { raw_text, .. } => raw_text,
        }
    }
}

/// Removes every ```` ``` ```` / ```` ```json ```` marker and trims the result.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Returns the greedy first-`{`-to-last-`}` span, or `None` when the text has
/// no opening brace followed by a closing one.
pub fn extract_json_span(text: &str) -> Option<&str> {
    JSON_SPAN.find(text).map(|m| m.as_str())
}

/// Extracts and parses the JSON object in `raw_text`.
pub fn normalize(raw_text: &str) -> Result<Value, ParseError> {
    let stripped = strip_code_fences(raw_text);
    let span = extract_json_span(&stripped).ok_or_else(|| ParseError::NoJsonObject {
        raw_text: raw_text.to_string(),
    })?;

    serde_json::from_str(span).map_err(|source| ParseError::InvalidJson {
        raw_text: raw_text.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "score": 42,
            "summary": "Too casual for a manager.",
            "audience_perception": {
                "primary_receiver": "Dismissive",
                "neutral_observer": "Unprofessional"
            },
            "highlights": [{"substring": "lol", "severity": "high"}],
            "rewritten_message": "Thank you for the update.",
            "rewritten_score": 90
        })
    }

    #[test]
    fn test_plain_json_round_trips() {
        let value = sample();
        assert_eq!(normalize(&value.to_string()).unwrap(), value);
        assert_eq!(
            normalize(&serde_json::to_string_pretty(&value).unwrap()).unwrap(),
            value
        );
    }

    #[test]
    fn test_fenced_json_is_recovered() {
        let value = sample();
        let fenced = format!("```json\n{}\n```", serde_json::to_string_pretty(&value).unwrap());
        assert_eq!(normalize(&fenced).unwrap(), value);

        let bare_fence = format!("```\n{value}\n```");
        assert_eq!(normalize(&bare_fence).unwrap(), value);
    }

    #[test]
    fn test_preamble_and_trailing_chatter_are_dropped() {
        let raw = "Sure! Here is the analysis you asked for:\n{\"draft\": \"Hi {name}\"}\nLet me know if you need more.";
        assert_eq!(normalize(raw).unwrap(), json!({"draft": "Hi {name}"}));
    }

    #[test]
    fn test_uppercase_fence_tag_is_stripped() {
        assert_eq!(strip_code_fences("```JSON\n{}\n```"), "{}");
    }

    #[test]
    fn test_extract_json_span_is_greedy() {
        let text = "prefix {\"a\": {\"b\": 1}} middle } suffix";
        assert_eq!(
            extract_json_span(text),
            Some("{\"a\": {\"b\": 1}} middle }")
        );
    }

    #[test]
    fn test_extract_json_span_none_without_braces() {
        assert_eq!(extract_json_span("I cannot help with that."), None);
        assert_eq!(extract_json_span("} backwards {"), None);
        assert_eq!(extract_json_span("{ unterminated"), None);
    }

    #[test]
    fn test_text_without_object_is_rejected() {
        let err = normalize("I'm sorry, I can't analyze that message.").unwrap_err();
        assert!(matches!(err, ParseError::NoJsonObject { .. }));
        assert_eq!(err.raw_text(), "I'm sorry, I can't analyze that message.");
    }

    #[test]
    fn test_malformed_json_is_not_repaired() {
        let err = normalize("{\"score\": 40,}").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));

        let err = normalize("{'score': 40}").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }

    #[test]
    fn test_greedy_span_across_two_objects_is_rejected() {
        let err = normalize("{\"a\": 1} and also {\"b\": 2}").unwrap_err();
        assert!(matches!(err, ParseError::InvalidJson { .. }));
    }
}
