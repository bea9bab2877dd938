//! Best-effort version extraction from free-form text

use regex::{Captures, Regex};

/// Dotted triple with an optional prerelease/build suffix and trailing tag.
pub const DEFAULT_STRICT_PATTERN: &str =
    r"v?(\d+)\.(\d+)\.(\d+)(?:[-+]([0-9A-Za-z][0-9A-Za-z.\-]*))?(?:\s+([A-Za-z]+))?";

/// Single-digit major, optional single-digit minor and an optional trailing tag.
pub const DEFAULT_LOOSE_PATTERN: &str = r"v?(\d)(?:[.\-_]?(\d))?(?:\s+([A-Za-z]+))?";

/// Extracts a `major.minor.patch` string from text.
///
/// The strict pattern is tried first; the loose pattern only runs when the
/// strict one finds nothing. Groups 1 to 3 are read as major, minor and patch,
/// and any group that did not participate in the match becomes `0`.
#[derive(Debug, Clone)]
pub struct VersionExtractor {
    strict: Regex,
    loose: Regex,
}

impl VersionExtractor {
    pub fn new(strict: &str, loose: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            strict: Regex::new(strict)?,
            loose: Regex::new(loose)?,
        })
    }

    /// Returns the version from the first match in `text`, if any.
    pub fn extract(&self, text: &str) -> Option<String> {
        self.strict
            .captures(text)
            .map(|caps| format_triple(&caps, 3))
            .or_else(|| self.loose.captures(text).map(|caps| format_triple(&caps, 2)))
    }
}

impl Default for VersionExtractor {
    fn default() -> Self {
        Self {
            strict: Regex::new(DEFAULT_STRICT_PATTERN).expect("strict pattern is valid"),
            loose: Regex::new(DEFAULT_LOOSE_PATTERN).expect("loose pattern is valid"),
        }
    }
}

// The loose pattern's third group is a tag, not a patch number
fn format_triple(caps: &Captures<'_>, numeric_groups: usize) -> String {
    let part = |index: usize| {
        if index > numeric_groups {
            return "0";
        }
        caps.get(index).map_or("0", |m| m.as_str())
    };
    format!("{}.{}.{}", part(1), part(2), part(3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/*! jQuery v3.7.1 | (c) OpenJS Foundation */", "3.7.1")]
    #[case("// lodash 4.17.21", "4.17.21")]
    #[case("Version: 10.2.0-beta.1 final", "10.2.0")]
    #[case("v1.2.3 and later v2.0.0", "1.2.3")]
    #[case("build 2.14.0+sha.abc", "2.14.0")]
    fn extract_uses_strict_pattern_first(#[case] text: &str, #[case] expected: &str) {
        let extractor = VersionExtractor::default();
        assert_eq!(extractor.extract(text), Some(expected.to_string()));
    }

    #[rstest]
    #[case("v3 final", "3.0.0")]
    #[case("release 2.5", "2.5.0")]
    #[case("v4-1 stable", "4.1.0")]
    fn extract_falls_back_to_loose_pattern(#[case] text: &str, #[case] expected: &str) {
        let extractor = VersionExtractor::default();
        assert_eq!(extractor.extract(text), Some(expected.to_string()));
    }

    #[rstest]
    #[case("")]
    #[case("no version here")]
    #[case("/* copyright the authors */")]
    fn extract_returns_none_without_digits(#[case] text: &str) {
        let extractor = VersionExtractor::default();
        assert_eq!(extractor.extract(text), None);
    }

    #[test]
    fn new_accepts_custom_patterns() {
        let extractor = VersionExtractor::new(r"rev(\d+)", r"(\d)").unwrap();

        assert_eq!(extractor.extract("rev42"), Some("42.0.0".to_string()));
        assert_eq!(extractor.extract("r7"), Some("7.0.0".to_string()));
    }

    #[test]
    fn new_rejects_invalid_pattern() {
        assert!(VersionExtractor::new(r"(\d+", DEFAULT_LOOSE_PATTERN).is_err());
    }
}
