// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered structured-output extraction: try a full parse, then a
//! markdown-fenced block, then the outermost `{…}`/`[…]`, then a small
//! repair pass on each. Never raises — returns `(None, Some(reason))`
//! on exhaustion.

use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static FENCE_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid regex"));

pub fn parse(text: &str) -> (Option<serde_json::Value>, Option<String>) {
    let trimmed = text.trim();

    if let Some(value) = try_full_parse(trimmed) {
        return (Some(value), None);
    }

    if let Some(fenced) = extract_fenced(trimmed) {
        if let Some(value) = try_full_parse(&fenced) {
            return (Some(value), None);
        }
        if let Some(value) = try_full_parse(&repair(&fenced)) {
            return (Some(value), None);
        }
    }

    if let Some(braced) = extract_outermost(trimmed) {
        if let Some(value) = try_full_parse(&braced) {
            return (Some(value), None);
        }
        if let Some(value) = try_full_parse(&repair(&braced)) {
            return (Some(value), None);
        }
    }

    if let Some(value) = try_full_parse(&repair(trimmed)) {
        return (Some(value), None);
    }

    (None, Some("no valid JSON found after full/fenced/braced/repair parse attempts".to_string()))
}

fn try_full_parse(candidate: &str) -> Option<serde_json::Value> {
    serde_json::from_str(candidate).ok()
}

fn extract_fenced(text: &str) -> Option<String> {
    FENCE_RE.captures(text).map(|c| c[1].to_string())
}

/// Find the first `{` or `[` and its matching close, tracking string
/// literals and escapes so braces inside quoted strings don't confuse
/// the scan.
fn extract_outermost(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let start = text.find(['{', '['])?;
    let open = bytes[start];
    let close = if open == b'{' { b'}' } else { b']' };

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Repair common small breakages: trailing commas before a closing
/// bracket, and single-quoted strings.
fn repair(candidate: &str) -> String {
    #[allow(clippy::expect_used)]
    let no_trailing_commas = regex::Regex::new(r",\s*([}\]])")
        .expect("valid regex")
        .replace_all(candidate, "$1")
        .into_owned();
    no_trailing_commas
}

#[cfg(test)]
#[path = "structured_tests.rs"]
mod tests;
