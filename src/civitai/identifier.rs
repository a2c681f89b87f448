//! Parsing of user-supplied Civitai references.
//!
//! Accepts bare model ids, AIR identifiers (`civitai:123@456`,
//! `urn:air:sdxl:lora:civitai:123@456`) and civitai.com links.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::{ParseError, Url};

/// AIR identifier anywhere in the input. Both prefixes are optional.
static AIR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:urn:air:sdxl:lora:)?(?:civitai:)?(\d+)@(\d+)")
        .expect("AIR regex should compile")
});

/// Base used to interpret scheme-less links such as `civitai.com/models/1`.
static RELATIVE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://civitai.com/").expect("base URL should parse"));

/// Model and version ids extracted from user input. Either may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentifierPair {
    pub model_id: Option<u64>,
    pub version_id: Option<u64>,
}

impl IdentifierPair {
    pub fn new(model_id: Option<u64>, version_id: Option<u64>) -> Self {
        Self {
            model_id,
            version_id,
        }
    }

    /// True when nothing usable was found.
    pub fn is_empty(&self) -> bool {
        self.model_id.is_none() && self.version_id.is_none()
    }
}

impl fmt::Display for IdentifierPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |id: Option<u64>| id.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
        write!(
            f,
            "model={} version={}",
            show(self.model_id),
            show(self.version_id)
        )
    }
}

/// Extract a `(model_id, version_id)` pair from free-form input.
///
/// Checked in order: AIR identifier anywhere in the text, a bare numeric
/// model id, then a civitai link. Malformed input is never an error; it
/// just yields an empty pair.
pub fn parse_identifier(input: &str) -> IdentifierPair {
    let input = input.trim();
    if input.is_empty() {
        return IdentifierPair::default();
    }

    if let Some(caps) = AIR_PATTERN.captures(input) {
        if let (Ok(model_id), Ok(version_id)) = (caps[1].parse(), caps[2].parse()) {
            return IdentifierPair::new(Some(model_id), Some(version_id));
        }
    }

    if is_digits(input) {
        if let Ok(model_id) = input.parse() {
            return IdentifierPair::new(Some(model_id), None);
        }
    }

    parse_link(input).unwrap_or_default()
}

fn parse_link(input: &str) -> Option<IdentifierPair> {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => RELATIVE_BASE.join(input).ok()?,
        Err(_) => return None,
    };

    let segments: Vec<&str> = url
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let mut version_id = url
        .query_pairs()
        .find(|(key, _)| key == "modelVersionId")
        .and_then(|(_, value)| numeric(&value));

    let model_id = segment_after(&segments, "models");

    if version_id.is_none() {
        version_id = segment_after(&segments, "model-versions");
    }

    Some(IdentifierPair::new(model_id, version_id))
}

/// Numeric segment directly following the first occurrence of `marker`.
fn segment_after(segments: &[&str], marker: &str) -> Option<u64> {
    let index = segments.iter().position(|s| *s == marker)?;
    segments.get(index + 1).and_then(|s| numeric(s))
}

fn numeric(s: &str) -> Option<u64> {
    if is_digits(s) {
        s.parse().ok()
    } else {
        None
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(model: Option<u64>, version: Option<u64>) -> IdentifierPair {
        IdentifierPair::new(model, version)
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_identifier("").is_empty());
        assert!(parse_identifier("   ").is_empty());
        assert!(parse_identifier("\n\t").is_empty());
    }

    #[test]
    fn test_bare_model_id() {
        assert_eq!(parse_identifier("12345"), pair(Some(12345), None));
        assert_eq!(parse_identifier("  0042 \n"), pair(Some(42), None));
        assert_eq!(parse_identifier("7"), pair(Some(7), None));
    }

    #[test]
    fn test_air_identifiers() {
        let expected = pair(Some(12345), Some(67890));
        assert_eq!(parse_identifier("12345@67890"), expected);
        assert_eq!(parse_identifier("civitai:12345@67890"), expected);
        assert_eq!(
            parse_identifier("urn:air:sdxl:lora:civitai:12345@67890"),
            expected
        );
    }

    #[test]
    fn test_air_found_inside_text() {
        assert_eq!(
            parse_identifier("use <lora:civitai:11@22> please"),
            pair(Some(11), Some(22))
        );
        // AIR wins over a link that carries different ids
        assert_eq!(
            parse_identifier("https://civitai.com/models/1?note=5@6"),
            pair(Some(5), Some(6))
        );
    }

    #[test]
    fn test_model_link() {
        assert_eq!(
            parse_identifier("https://civitai.com/models/123"),
            pair(Some(123), None)
        );
        assert_eq!(
            parse_identifier("https://civitai.com/models/123/some-lora-name"),
            pair(Some(123), None)
        );
    }

    #[test]
    fn test_model_link_with_version_query() {
        assert_eq!(
            parse_identifier("https://civitai.com/models/123?modelVersionId=456"),
            pair(Some(123), Some(456))
        );
        assert_eq!(
            parse_identifier("https://civitai.com/models/123/name?foo=bar&modelVersionId=456"),
            pair(Some(123), Some(456))
        );
    }

    #[test]
    fn test_version_link() {
        assert_eq!(
            parse_identifier("https://civitai.com/api/v1/model-versions/456"),
            pair(None, Some(456))
        );
    }

    #[test]
    fn test_query_version_takes_precedence_over_path() {
        assert_eq!(
            parse_identifier("https://civitai.com/model-versions/1?modelVersionId=2"),
            pair(None, Some(2))
        );
    }

    #[test]
    fn test_non_numeric_parts_are_ignored() {
        assert_eq!(
            parse_identifier("https://civitai.com/models/abc?modelVersionId=xyz"),
            pair(None, None)
        );
        assert_eq!(
            parse_identifier("https://civitai.com/models"),
            pair(None, None)
        );
    }

    #[test]
    fn test_link_without_scheme() {
        assert_eq!(
            parse_identifier("civitai.com/models/99?modelVersionId=100"),
            pair(Some(99), Some(100))
        );
    }

    #[test]
    fn test_garbage_is_inconclusive() {
        assert!(parse_identifier("not a model").is_empty());
        assert!(parse_identifier("http://[::1").is_empty());
        assert!(parse_identifier("12a45").is_empty());
    }

    #[test]
    fn test_overflowing_id_is_inconclusive() {
        assert!(parse_identifier("99999999999999999999999").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(pair(Some(1), None).to_string(), "model=1 version=-");
    }
}
