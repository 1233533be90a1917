// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-limit detection and exponential backoff shared by every
//! `execute_with_retry` implementation.

use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static RATE_LIMIT_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)rate limit|429|resource_exhausted|quota").expect("valid regex")
});

pub fn looks_rate_limited(combined_output: &str) -> bool {
    RATE_LIMIT_RE.is_match(combined_output)
}

/// Delay before the k-th retry (1-indexed): `base * 2^(k-1)`, capped.
pub fn backoff_delay_ms(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp = attempt.saturating_sub(1).min(16);
    let scaled = base_ms.saturating_mul(1u64 << exp);
    scaled.min(max_ms)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
