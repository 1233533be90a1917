// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sensitive-pattern redaction applied before output reaches a log sink
//! or a user-visible failure message. Covers the common bearer-token and
//! credential shapes seen in agent stdout/stderr; callers needing
//! project-specific rules layer their own patterns on top.

use std::sync::LazyLock;

const REDACTED: &str = "[REDACTED]";

#[allow(clippy::expect_used)]
static PATTERNS: LazyLock<Vec<regex::Regex>> = LazyLock::new(|| {
    [
        r"Bearer\s+[A-Za-z0-9\-._~+/]+=*",
        r"sk-[A-Za-z0-9]{16,}",
        r"gh[pousr]_[A-Za-z0-9]{20,}",
        r"eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+",
        r"(?i)(password|token|key)\s*=\s*\S+",
    ]
    .iter()
    .map(|p| regex::Regex::new(p).expect("static redaction pattern is valid"))
    .collect()
});

/// Replace every sensitive substring in `text` with `[REDACTED]`.
pub fn redact(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in PATTERNS.iter() {
        out = pattern.replace_all(&out, REDACTED).into_owned();
    }
    out
}

/// Trim to the last `max_chars` characters, preserving the tail of a
/// captured process output (the end of a log is usually where the
/// actual failure message lives).
pub fn tail(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        text.chars().skip(char_count - max_chars).collect()
    }
}

#[cfg(test)]
#[path = "redact_tests.rs"]
mod tests;
