//! Sanitizer stage registry.
//!
//! Named, pure value transforms applied strictly in declared order. Only
//! string values are transformed; everything else passes through untouched.
//! An unrecognized sanitizer name is a no-op pass-through, not a failure.

use params_core::{Op, OpArg, Value};
use regex::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)[^>]*>").unwrap())
}

/// Applies a single sanitize operation to a value.
pub fn apply(op: &Op, value: Value) -> Value {
    let Value::String(text) = value else {
        return value;
    };

    let transformed = match op.name.as_str() {
        "trim" => text.trim().to_string(),
        "upcase" => text.to_uppercase(),
        "downcase" => text.to_lowercase(),
        "capitalize" => capitalize(&text),
        "strip_tags" => strip_tags(&text, &op.arg),
        "encode_tags" => text.replace('<', "&lt;").replace('>', "&gt;"),
        _ => text,
    };

    Value::String(transformed)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Removes HTML tags; an allow-list argument keeps the named tags.
fn strip_tags(text: &str, arg: &OpArg) -> String {
    let allowed: Vec<&str> = match arg {
        OpArg::List(items) => items
            .iter()
            .filter_map(|item| match item {
                OpArg::Tag(t) | OpArg::Str(t) => Some(t.as_str()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    tag_regex()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let tag = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            if allowed.iter().any(|a| a.eq_ignore_ascii_case(tag)) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}
