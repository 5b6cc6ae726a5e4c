//! Text-level repairs for model output that is almost, but not quite, JSON.
//!
//! Each rule is a pure `&str -> Option<String>` transform (`None` means the
//! rule had nothing to do). Rules are grouped into per-kind strategies because
//! the code-escaping and symbol rules fight each other on the same text.

use crate::common::error::RepairError;
use crate::core::document::DocumentKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const CODE_PLACEHOLDER: &str = "<code removed for stability>";

static CODE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:code_example|example_code|code)"\s*:\s*""#).expect("code field pattern is valid")
});

/// What may follow the closing quote of a string value.
static VALUE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:\}|\]|,\s*"[^"\\]+"\s*:|$)"#).expect("value end pattern is valid")
});

static TRAILING_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",(\s*[}\]])").expect("trailing comma pattern is valid"));

const MATH_SYMBOLS: &[(char, &str)] = &[
    ('π', "pi"),
    ('≈', "approximately"),
    ('∞', "infinity"),
    ('≤', "<="),
    ('≥', ">="),
    ('≠', "!="),
    ('×', "x"),
    ('÷', "/"),
    ('√', "sqrt"),
    ('±', "+/-"),
    ('²', "^2"),
    ('³', "^3"),
    ('°', " degrees"),
    ('θ', "theta"),
    ('α', "alpha"),
    ('β', "beta"),
    ('Σ', "sum"),
    ('Δ', "delta"),
    ('λ', "lambda"),
    ('μ', "mu"),
];

pub trait RepairRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, text: &str) -> Option<String>;
}

/// Escapes raw backslashes, newlines, carriage returns, tabs and quotes inside code fields.
pub struct EscapeCodeFields;

impl RepairRule for EscapeCodeFields {
    fn name(&self) -> &'static str {
        "escape_code_fields"
    }

    fn apply(&self, text: &str) -> Option<String> {
        rewrite_code_fields(text, true, |body| {
            if is_json_string_body(body) {
                return None;
            }
            // Order matters: backslashes first or the later escapes get doubled.
            Some(
                body.replace('\\', "\\\\")
                    .replace('\n', "\\n")
                    .replace('\r', "\\r")
                    .replace('\t', "\\t")
                    .replace('"', "\\\""),
            )
        })
    }
}

pub struct StripTrailingCommas;

impl RepairRule for StripTrailingCommas {
    fn name(&self) -> &'static str {
        "strip_trailing_commas"
    }

    fn apply(&self, text: &str) -> Option<String> {
        match TRAILING_COMMA.replace_all(text, "$1") {
            std::borrow::Cow::Borrowed(_) => None,
            std::borrow::Cow::Owned(fixed) => Some(fixed),
        }
    }
}

pub struct ReplaceMathSymbols;

impl RepairRule for ReplaceMathSymbols {
    fn name(&self) -> &'static str {
        "replace_math_symbols"
    }

    fn apply(&self, text: &str) -> Option<String> {
        if !text.chars().any(|c| MATH_SYMBOLS.iter().any(|(symbol, _)| *symbol == c)) {
            return None;
        }
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match MATH_SYMBOLS.iter().find(|(symbol, _)| *symbol == c) {
                Some((_, ascii)) => out.push_str(ascii),
                None => out.push(c),
            }
        }
        Some(out)
    }
}

/// Doubles backslashes that do not start a valid JSON escape.
///
/// `\b` and `\f` followed by a letter are read as LaTeX (`\frac`, `\beta`), not as escapes.
pub struct EscapeStrayBackslashes;

impl RepairRule for EscapeStrayBackslashes {
    fn name(&self) -> &'static str {
        "escape_stray_backslashes"
    }

    fn apply(&self, text: &str) -> Option<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut changed = false;
        let mut i = 0;
        while i < chars.len() {
            if chars[i] != '\\' {
                out.push(chars[i]);
                i += 1;
                continue;
            }
            let next = chars.get(i + 1).copied();
            let after = chars.get(i + 2).copied();
            let valid = match next {
                Some('"') | Some('\\') | Some('/') | Some('n') | Some('r') | Some('t') => true,
                Some('b') | Some('f') => !after.map_or(false, |c| c.is_ascii_alphabetic()),
                Some('u') => {
                    chars.len() >= i + 6 && chars[i + 2..i + 6].iter().all(char::is_ascii_hexdigit)
                }
                _ => false,
            };
            if valid {
                out.push('\\');
                if let Some(c) = next {
                    out.push(c);
                }
                i += 2;
            } else {
                out.push_str("\\\\");
                changed = true;
                i += 1;
            }
        }
        changed.then_some(out)
    }
}

static CODE_RULES: &[&dyn RepairRule] = &[&EscapeCodeFields, &StripTrailingCommas];
static SYMBOL_RULES: &[&dyn RepairRule] =
    &[&ReplaceMathSymbols, &EscapeStrayBackslashes, &StripTrailingCommas];
static BASIC_RULES: &[&dyn RepairRule] = &[&StripTrailingCommas];

pub fn rules_for(kind: DocumentKind) -> &'static [&'static dyn RepairRule] {
    match kind {
        DocumentKind::Tutorial => CODE_RULES,
        DocumentKind::Quiz => SYMBOL_RULES,
        DocumentKind::Roadmap => BASIC_RULES,
    }
}

pub fn apply_rules(text: &str, rules: &[&dyn RepairRule]) -> String {
    let mut current = text.to_string();
    for rule in rules {
        if let Some(next) = rule.apply(&current) {
            tracing::debug!(rule = rule.name(), "repair rule applied");
            current = next;
        }
    }
    current
}

/// Repairs `candidate` with the strategy for `kind`, falling back to blanking code fields.
pub fn repair(candidate: &str, kind: DocumentKind) -> Result<Value, RepairError> {
    let rules = rules_for(kind);
    let repaired = apply_rules(candidate.trim(), rules);
    let original_error = match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    tracing::warn!(
        "JSON still invalid after repair at line {} column {}: {}",
        original_error.line(),
        original_error.column(),
        original_error
    );

    if let Some(blanked) = blank_code_fields(candidate.trim()) {
        let retried = apply_rules(&blanked, rules);
        if let Ok(value) = serde_json::from_str::<Value>(&retried) {
            tracing::info!("Parsed JSON after removing problematic code examples");
            return Ok(value);
        }
    }

    Err(RepairError::Unrecoverable(original_error.to_string()))
}

/// Replaces the whole value of every code field with [`CODE_PLACEHOLDER`].
///
/// Escapes inside the value are ignored when looking for its end, so a body
/// ending in a stray backslash is still cut at the next key.
pub fn blank_code_fields(text: &str) -> Option<String> {
    rewrite_code_fields(text, false, |body| {
        (body != CODE_PLACEHOLDER).then(|| CODE_PLACEHOLDER.to_string())
    })
}

fn is_json_string_body(body: &str) -> bool {
    serde_json::from_str::<String>(&format!("\"{}\"", body)).is_ok()
}

/// Rewrites code field bodies with `f`; `None` from `f` keeps a body as is.
fn rewrite_code_fields<F>(text: &str, honor_escapes: bool, f: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut changed = false;

    while let Some(key) = CODE_FIELD.find_at(text, cursor) {
        let body_start = key.end();
        let Some(body_end) = find_value_end(text, body_start, honor_escapes) else {
            break;
        };
        out.push_str(&text[cursor..body_start]);
        let body = &text[body_start..body_end];
        match f(body) {
            Some(replacement) => {
                out.push_str(&replacement);
                changed = true;
            }
            None => out.push_str(body),
        }
        cursor = body_end;
    }

    if !changed {
        return None;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

/// Byte offset of the quote closing a string value that starts at `start`.
fn find_value_end(text: &str, start: usize, honor_escapes: bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            let backslashes = bytes[start..i].iter().rev().take_while(|&&b| b == b'\\').count();
            if (!honor_escapes || backslashes % 2 == 0) && VALUE_END.is_match(&text[i + 1..]) {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}
