use course_gen::core::generator::{recover, validate_document};
use course_gen::core::postprocess::{strip_quiz_level, DEFAULT_PREREQUISITE};
use course_gen::error::GenerationError;
use course_gen::DocumentKind;
use serde_json::json;

fn tutorial_reply(code_body: &str) -> String {
    format!(
        "Here is your tutorial:\n```json\n{{\n  \"title\": \"Iterators\",\n  \"estimated_time\": \"20 minutes\",\n  \"overview\": \"Lazy sequences.\",\n  \"sections\": [\n    {{\"section_title\": \"Basics\", \"content\": \"Call iter().\", \"code_example\": \"{}\"}}\n  ],\n  \"practice_exercises\": [\"Sum a vector\"],\n  \"additional_resources\": [],\n}}\n```\nEnjoy!",
        code_body
    )
}

#[test]
fn test_tutorial_with_raw_code_recovers_and_validates() {
    let raw = tutorial_reply("let v = vec![1, 2];\nlet s: i32 = v.iter().sum();\nprintln!(\"{}\", s);");

    let mut doc = recover(&raw, DocumentKind::Tutorial).unwrap();
    validate_document(&mut doc, DocumentKind::Tutorial).unwrap();

    assert_eq!(
        doc["sections"][0]["code_example"],
        "let v = vec![1, 2];\nlet s: i32 = v.iter().sum();\nprintln!(\"{}\", s);"
    );
}

#[test]
fn test_tutorial_missing_prerequisites_is_healed() {
    let mut doc = json!({
        "title": "Iterators",
        "estimated_time": "20 minutes",
        "overview": "Lazy sequences.",
        "sections": [{"section_title": "Basics", "content": "Call iter()."}],
        "practice_exercises": [],
        "additional_resources": [],
        "prerequisites": []
    });

    validate_document(&mut doc, DocumentKind::Tutorial).unwrap();

    assert_eq!(doc["prerequisites"][0], DEFAULT_PREREQUISITE);
    assert_eq!(doc["practice_exercises"].as_array().unwrap().len(), 1);
}

#[test]
fn test_quiz_with_latex_and_symbols() {
    let raw = r#"{
        "title": "Quiz on Algebra",
        "description": "Quadratics.",
        "level": "Beginner",
        "questions": [
            {
                "question": "Solve \( x² = 4 \) for x ≥ 0",
                "options": ["1", "2", "4", "-2"],
                "correct_answer": "2",
                "explanation": "√4 = 2",
            },
        ]
    }"#;

    let mut doc = recover(raw, DocumentKind::Quiz).unwrap();
    validate_document(&mut doc, DocumentKind::Quiz).unwrap();
    strip_quiz_level(&mut doc);

    let question = doc["questions"][0]["question"].as_str().unwrap();
    assert!(question.contains("\\( x^2 = 4 \\)"));
    assert!(question.contains(">= 0"));
    assert_eq!(doc["questions"][0]["explanation"], "sqrt4 = 2");
    assert!(doc.get("level").is_none());
}

#[test]
fn test_roadmap_nested_failure_reports_location() {
    let mut doc = json!({
        "course_title": "Data Engineering",
        "description": "Pipelines.",
        "level": "Intermediate",
        "duration": "4 months",
        "modules": [
            {"module_title": "SQL", "topics": ["Joins"]},
            {"module_title": "Spark"}
        ]
    });

    match validate_document(&mut doc, DocumentKind::Roadmap) {
        Err(GenerationError::Validation(reason)) => {
            assert_eq!(reason, "Missing required field: modules[1].topics");
        }
        other => panic!("expected a validation failure, got {:?}", other),
    }
}

#[test]
fn test_prose_only_reply_is_not_repaired() {
    let result = recover("I cannot help with that request.", DocumentKind::Roadmap);

    assert!(matches!(result, Err(GenerationError::Extraction(_))));
}
