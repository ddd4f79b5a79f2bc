// Shared prompt fragments. Each task module keeps its own prompts.rs;
// this file holds the pieces every task shares.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder regex");
}

/// Appended to every task's system prompt. JSON mode is requested from the
/// vendors as well, but neither guarantees it.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Joins a task's instructions with the JSON-only contract.
pub fn with_json_contract(task_system_prompt: &str) -> String {
    format!("{}\n\n{}", task_system_prompt.trim(), JSON_ONLY_SYSTEM)
}

/// Fills `{name}` placeholders in one pass. Substituted values are never
/// rescanned, so a value containing `{other}` stays literal. Placeholders
/// without a value are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_json_contract_appends_fragment() {
        let prompt = with_json_contract("  Act as a coach.\n");
        assert!(prompt.starts_with("Act as a coach."));
        assert!(prompt.ends_with(JSON_ONLY_SYSTEM));
    }

    #[test]
    fn test_fill_template_substitutes_each_placeholder() {
        let filled = fill_template("To {receiver}, in a {tone} tone.", &[
            ("receiver", "Boss"),
            ("tone", "calm"),
        ]);
        assert_eq!(filled, "To Boss, in a calm tone.");
    }

    #[test]
    fn test_fill_template_leaves_values_unscanned() {
        let filled = fill_template("{a} then {b}", &[("a", "{b}"), ("b", "two")]);
        assert_eq!(filled, "{b} then two");
    }

    #[test]
    fn test_fill_template_keeps_unknown_placeholders() {
        assert_eq!(fill_template("keep {this}", &[]), "keep {this}");
    }
}
