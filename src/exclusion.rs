//! Site exclusion list: regex patterns matched against the page URL.

use regex::Regex;
use reqwest::Url;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid regex pattern: {0}")]
    Invalid(#[from] regex::Error),
    #[error("pattern is empty")]
    Empty,
    #[error("unable to process site URL: {0}")]
    BadUrl(String),
}

/// Check a pattern before it is stored. Returns the trimmed pattern.
pub fn validate_pattern(pattern: &str) -> Result<&str, PatternError> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(PatternError::Empty);
    }
    Regex::new(pattern)?;
    Ok(pattern)
}

/// Whether any stored pattern matches the URL. Malformed patterns are
/// skipped, never fatal.
pub fn is_excluded<S: AsRef<str>>(url: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|pattern| {
        let pattern = pattern.as_ref();
        match Regex::new(pattern) {
            Ok(re) => re.is_match(url),
            Err(e) => {
                warn!(pattern, error = %e, "skipping invalid exclusion pattern");
                false
            }
        }
    })
}

/// Pattern covering every page on the URL's host, e.g. `.*example\.com.*`.
pub fn site_pattern(url: &str) -> Result<String, PatternError> {
    let parsed = Url::parse(url.trim()).map_err(|_| PatternError::BadUrl(url.to_string()))?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| PatternError::BadUrl(url.to_string()))?;
    Ok(format!(".*{}.*", host.replace('.', "\\.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_pattern_excludes() {
        let patterns = vec![r".*example\.com.*".to_string()];
        assert!(is_excluded("https://example.com/page", &patterns));
        assert!(!is_excluded("https://rust-lang.org/", &patterns));
    }

    #[test]
    fn invalid_patterns_are_skipped() {
        let patterns = ["(unclosed", r".*docs\.rs.*"];
        assert!(is_excluded("https://docs.rs/scraper", &patterns));
        assert!(!is_excluded("https://example.com", &patterns));
    }

    #[test]
    fn validation_rejects_bad_input() {
        assert!(matches!(validate_pattern("[a-"), Err(PatternError::Invalid(_))));
        assert!(matches!(validate_pattern("   "), Err(PatternError::Empty)));
        assert_eq!(validate_pattern("  .*foo.*  ").unwrap(), ".*foo.*");
    }

    #[test]
    fn site_pattern_escapes_dots() {
        assert_eq!(
            site_pattern("https://news.ycombinator.com/item?id=1").unwrap(),
            r".*news\.ycombinator\.com.*"
        );
        assert!(site_pattern("not a url").is_err());
    }

    #[test]
    fn site_pattern_matches_its_own_site() {
        let pattern = site_pattern("https://example.com/a").unwrap();
        assert!(is_excluded("https://example.com/b/c", &[pattern]));
    }
}
