//! Token cost estimation.
//!
//! A fixed chars-per-token heuristic, not a real tokenizer. Applied uniformly
//! to whole-object JSON encodings at build time and to rendered prompt text at
//! runtime, so both sides of the system budget with the same yardstick.

use serde::Serialize;

/// Approximate chars-per-token ratio.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token cost of a rendered string.
pub fn estimate_text_tokens(text: &str) -> u64 {
    text.len().div_ceil(CHARS_PER_TOKEN) as u64
}

/// Estimate the token cost of a value's canonical JSON encoding.
pub fn estimate_json_tokens<T: Serialize>(value: &T) -> u64 {
    serde_json::to_string(value)
        .map(|s| estimate_text_tokens(&s))
        .unwrap_or(0)
}
