//! Fix-ups applied to parsed documents outside of schema validation.

use serde_json::Value;

pub const DEFAULT_PREREQUISITE: &str = "Basic knowledge of the subject";
pub const DEFAULT_EXERCISE: &str = "Practice implementing the concepts covered in this tutorial";
pub const SIMPLIFIED_CODE: &str = "# Simplified example\nprint('Example code')";

/// Fills empty `prerequisites` / `practice_exercises` with a default entry.
/// Returns whether anything changed.
pub fn heal_tutorial(doc: &mut Value) -> bool {
    let Some(object) = doc.as_object_mut() else {
        return false;
    };
    let mut healed = false;
    for (field, default) in [
        ("prerequisites", DEFAULT_PREREQUISITE),
        ("practice_exercises", DEFAULT_EXERCISE),
    ] {
        if let Some(value) = object.get_mut(field) {
            if is_empty(value) {
                *value = Value::Array(vec![Value::String(default.to_string())]);
                healed = true;
            }
        }
    }
    healed
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Replaces section code examples longer than `max_len` characters. Zero disables.
pub fn trim_code_examples(doc: &mut Value, max_len: usize) {
    if max_len == 0 {
        return;
    }
    let Some(sections) = doc.get_mut("sections").and_then(Value::as_array_mut) else {
        return;
    };
    for section in sections {
        if let Some(code) = section.get_mut("code_example") {
            if code.as_str().map_or(false, |c| c.chars().count() > max_len) {
                *code = Value::String(SIMPLIFIED_CODE.to_string());
            }
        }
    }
}

/// Quiz responses do not echo the requested level back.
pub fn strip_quiz_level(doc: &mut Value) {
    if let Some(object) = doc.as_object_mut() {
        object.remove("level");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_heal_fills_empty_lists() {
        let mut doc = json!({"prerequisites": [], "practice_exercises": [], "title": "T"});
        assert!(heal_tutorial(&mut doc));
        assert_eq!(doc["prerequisites"], json!([DEFAULT_PREREQUISITE]));
        assert_eq!(doc["practice_exercises"], json!([DEFAULT_EXERCISE]));
    }

    #[test]
    fn test_heal_leaves_absent_and_filled_fields() {
        let mut doc = json!({"practice_exercises": ["Do it"]});
        assert!(!heal_tutorial(&mut doc));
        assert!(doc.get("prerequisites").is_none());
        assert_eq!(doc["practice_exercises"], json!(["Do it"]));
    }

    #[test]
    fn test_trim_code_examples() {
        let long = "x".repeat(201);
        let mut doc = json!({"sections": [
            {"section_title": "A", "content": "a", "code_example": long},
            {"section_title": "B", "content": "b", "code_example": "short"},
            {"section_title": "C", "content": "c"}
        ]});
        trim_code_examples(&mut doc, 200);
        assert_eq!(doc["sections"][0]["code_example"], SIMPLIFIED_CODE);
        assert_eq!(doc["sections"][1]["code_example"], "short");
        assert!(doc["sections"][2].get("code_example").is_none());
    }

    #[test]
    fn test_strip_quiz_level() {
        let mut doc = json!({"title": "Q", "level": "Beginner"});
        strip_quiz_level(&mut doc);
        assert_eq!(doc, json!({"title": "Q"}));
    }
}
