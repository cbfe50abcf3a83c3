//! Version ordering for version listings

use semver::Version;
use std::cmp::Ordering;

/// Parse a version, tolerating a leading `v` and missing minor/patch parts
pub fn parse_lenient(version: &str) -> Option<Version> {
    let trimmed = version.strip_prefix('v').unwrap_or(version);
    if let Ok(parsed) = Version::parse(trimmed) {
        return Some(parsed);
    }

    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(split);
    let components = core.split('.').count();
    if core.is_empty() || components >= 3 {
        return None;
    }

    let padded = format!("{}{}{}", core, ".0".repeat(3 - components), rest);
    Version::parse(&padded).ok()
}

/// Compare two version strings by semver precedence.
///
/// Unparseable versions sort after parseable ones; ties fall back to plain
/// string order so the result is total.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let by_precedence = match (parse_lenient(a), parse_lenient(b)) {
        (Some(a), Some(b)) => a.cmp_precedence(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_precedence.then_with(|| a.cmp(b))
}

/// Sort versions ascending and drop duplicates
pub fn sort_versions(mut versions: Vec<String>) -> Vec<String> {
    versions.sort_by(|a, b| compare_versions(a, b));
    versions.dedup();
    versions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_sorts_by_semver() {
        let sorted = sort_versions(strings(&["1.10.0", "1.2.0", "1.9.1", "0.9.0"]));
        assert_eq!(sorted, strings(&["0.9.0", "1.2.0", "1.9.1", "1.10.0"]));
    }

    #[test]
    fn test_prerelease_before_release() {
        let sorted = sort_versions(strings(&["2.0.0", "2.0.0-beta.1", "2.0.0-alpha.1"]));
        assert_eq!(sorted, strings(&["2.0.0-alpha.1", "2.0.0-beta.1", "2.0.0"]));
    }

    #[test]
    fn test_deduplicates() {
        let sorted = sort_versions(strings(&["1.0.0", "1.0.0", "0.1.0"]));
        assert_eq!(sorted, strings(&["0.1.0", "1.0.0"]));
    }

    #[test]
    fn test_lenient_parsing() {
        assert_eq!(parse_lenient("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse_lenient("v3"), Some(Version::new(3, 0, 0)));
        assert!(parse_lenient("1.0.0rc1").is_none());
        assert!(parse_lenient("").is_none());
    }

    #[test]
    fn test_unparseable_versions_sort_last() {
        let sorted = sort_versions(strings(&["latest-ish", "1.0.0rc1", "0.5", "1.0.0"]));
        assert_eq!(sorted, strings(&["0.5", "1.0.0", "1.0.0rc1", "latest-ish"]));
    }
}
