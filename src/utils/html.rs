//! HTML to plain text utilities.

use std::sync::LazyLock;

use regex::Regex;

/// Anything between angle brackets, shortest match.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("tag regex should compile"));

/// Remove HTML tags and trim surrounding whitespace.
///
/// This is a permissive pass, not a parser: entities are left as-is and a
/// stray `<` without a closing `>` survives.
pub fn strip_tags(html: &str) -> String {
    TAG_PATTERN.replace_all(html, "").trim().to_string()
}
