//! Custom assertion helpers for integration tests.

use dc_protocol::framing::{parse_message, ParsedMessage};

/// Assert that a sentinel-framed answer parses to the given text and sources.
#[allow(dead_code)]
pub fn assert_framed_answer(content: &str, answer: &str, sources: &[&str]) -> ParsedMessage {
    let parsed = parse_message(content);
    assert_eq!(parsed.answer, answer, "Unexpected answer in {:?}", content);

    let actual = parsed.sources();
    let expected: Vec<Option<&str>> = sources.iter().map(|s| Some(*s)).collect();
    assert_eq!(actual, expected, "Unexpected sources in {:?}", content);

    parsed
}

/// Assert that a string contains a substring (case-insensitive).
#[allow(dead_code)]
pub fn assert_contains_ci(haystack: &str, needle: &str) {
    let haystack_lower = haystack.to_lowercase();
    let needle_lower = needle.to_lowercase();
    assert!(
        haystack_lower.contains(&needle_lower),
        "Expected '{}' to contain '{}' (case-insensitive)",
        haystack,
        needle
    );
}

/// Assert that `needle` occurs exactly once in `haystack`.
#[allow(dead_code)]
pub fn assert_occurs_once(haystack: &str, needle: &str) {
    let count = haystack.matches(needle).count();
    assert_eq!(
        count, 1,
        "Expected '{}' exactly once in '{}', found {}",
        needle, haystack, count
    );
}
