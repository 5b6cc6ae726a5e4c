//! Pulls a JSON document out of free-form model output.
//!
//! Stages run in order and the first one that parses wins:
//! the whole text, then fenced code blocks (`json`-labelled before unlabelled),
//! then the span from the first `{` to the last `}`.

use crate::common::error::ExtractionError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_+-]*)[ \t]*\r?\n?(.*?)```").expect("fence pattern is valid")
});

pub fn extract(raw: &str) -> Result<Value, ExtractionError> {
    let text = raw.trim();
    if text.is_empty() {
        tracing::error!("Empty response received from the model");
        return Err(ExtractionError::EmptyResponse);
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    for body in fenced_blocks(text) {
        if let Ok(value) = serde_json::from_str::<Value>(body.trim()) {
            tracing::debug!("JSON recovered from fenced block");
            return Ok(value);
        }
    }

    if let Some(span) = brace_span(text) {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            tracing::debug!("JSON recovered from brace span");
            return Ok(value);
        }
    }

    tracing::debug!("No JSON found in response excerpt: {}", excerpt(text, 200));
    Err(ExtractionError::NoJsonFound)
}

/// The substring most likely to hold the document, for the repair stage.
pub fn json_candidate(raw: &str) -> &str {
    let text = raw.trim();
    if let Some(span) = brace_span(text) {
        return span;
    }
    fenced_blocks(text)
        .into_iter()
        .next()
        .map(str::trim)
        .unwrap_or(text)
}

/// Fence bodies, `json`-labelled blocks first, each group in document order.
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut labelled = Vec::new();
    let mut other = Vec::new();
    for caps in FENCE.captures_iter(text) {
        let label = caps.get(1).map_or("", |m| m.as_str());
        let Some(body) = caps.get(2) else { continue };
        if label.eq_ignore_ascii_case("json") {
            labelled.push(body.as_str());
        } else {
            other.push(body.as_str());
        }
    }
    labelled.extend(other);
    labelled
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

pub(crate) fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
