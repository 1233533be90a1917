// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reviewer's machine-readable decision (spec §4.I, §8 scenario 3):
//! scanned with a regex anchored to line boundaries, taking the **last**
//! match so an example verdict quoted inside a fenced code block earlier
//! in the document can never be mistaken for the real one.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static VERDICT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s*VERDICT:\s*(APPROVED|REVISE)\s*$").expect("static verdict pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    /// Also the value used when no verdict line is present at all.
    Revise,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Approved => "APPROVED",
            Verdict::Revise => "REVISE",
        }
    }
}

/// Scan `text` for every `## VERDICT: …` line and return the last one
/// found. A missing verdict parses as [`Verdict::Revise`].
pub fn parse_verdict(text: &str) -> Verdict {
    match VERDICT_LINE.captures_iter(text).last() {
        Some(caps) if &caps[1] == "APPROVED" => Verdict::Approved,
        _ => Verdict::Revise,
    }
}

#[cfg(test)]
#[path = "verdict_tests.rs"]
mod tests;
