//! Canonical package identifiers
//!
//! A canonical is a registry-qualified package name such as `npm:@sentry/react`
//! or `pypi:sentry-sdk`. The part before the first colon names the registry,
//! the rest is a package path below `packages/<registry>/`. Further colons in
//! the package part act as path separators, so `npm:@sentry:react` and
//! `npm:@sentry/react` point at the same directory.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{RegistryError, Result};

/// Directory below the registry root that holds all package records
pub const PACKAGES_DIR: &str = "packages";

/// Marker file that turns a directory into a package scope (e.g. `@sentry`)
pub const NAMESPACE_FILE_MARKER: &str = "__NAMESPACE__";

/// File name of the "latest" alias inside every versioned directory
pub const LATEST: &str = "latest";

/// Validate a single path component taken from user input.
///
/// Rejects empty components, `.` and `..`, and anything containing a path
/// separator.
pub fn validate_path_component(component: &str) -> Result<()> {
    if component.is_empty()
        || component == "."
        || component == ".."
        || component.contains('/')
        || component.contains('\\')
    {
        return Err(RegistryError::InvalidPathComponent(component.to_string()));
    }
    Ok(())
}

/// File name for a version record, e.g. `1.2.3.json` or `latest.json`
pub fn version_file_name(version: &str) -> Result<String> {
    validate_path_component(version)?;
    Ok(format!("{}.json", version))
}

/// A parsed canonical package identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Canonical {
    registry: String,
    segments: Vec<String>,
}

impl Canonical {
    /// Parse a canonical identifier
    pub fn parse(value: &str) -> Result<Self> {
        let (registry, package) = value
            .split_once(':')
            .ok_or_else(|| RegistryError::InvalidCanonical(value.to_string()))?;

        validate_path_component(registry)?;

        let segments = package
            .split(|c: char| c == ':' || c == '/')
            .map(|segment| {
                validate_path_component(segment)?;
                Ok(segment.to_string())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            registry: registry.to_string(),
            segments,
        })
    }

    /// Build a canonical for a scoped package found under a namespace directory
    pub fn scoped(registry: &str, scope: &str, name: &str) -> Self {
        Self {
            registry: registry.to_string(),
            segments: vec![scope.to_string(), name.to_string()],
        }
    }

    /// Build a canonical for an unscoped package
    pub fn unscoped(registry: &str, name: &str) -> Self {
        Self {
            registry: registry.to_string(),
            segments: vec![name.to_string()],
        }
    }

    /// Registry name (`npm`, `pypi`, ...)
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Package path segments below the registry directory
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Package path joined with `/`
    pub fn package(&self) -> String {
        self.segments.join("/")
    }

    /// Directory holding this package's version records
    pub fn package_dir(&self, root: &Path) -> PathBuf {
        let mut dir = root.join(PACKAGES_DIR).join(&self.registry);
        for segment in &self.segments {
            dir.push(segment);
        }
        dir
    }

    /// Path of a specific version record
    pub fn version_path(&self, root: &Path, version: &str) -> Result<PathBuf> {
        Ok(self.package_dir(root).join(version_file_name(version)?))
    }
}

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.registry, self.package())
    }
}

impl FromStr for Canonical {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Canonical {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Canonical {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Canonical::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_canonical() {
        let canonical = Canonical::parse("pypi:sentry-sdk").unwrap();
        assert_eq!(canonical.registry(), "pypi");
        assert_eq!(canonical.segments(), &["sentry-sdk".to_string()]);
        assert_eq!(canonical.to_string(), "pypi:sentry-sdk");
    }

    #[test]
    fn test_parse_scoped_canonical() {
        let canonical = Canonical::parse("npm:@sentry/react").unwrap();
        assert_eq!(canonical.registry(), "npm");
        assert_eq!(canonical.package(), "@sentry/react");
    }

    #[test]
    fn test_extra_colons_become_separators() {
        let with_colon = Canonical::parse("npm:@sentry:react").unwrap();
        let with_slash = Canonical::parse("npm:@sentry/react").unwrap();
        assert_eq!(with_colon, with_slash);
        assert_eq!(with_colon.to_string(), "npm:@sentry/react");
    }

    #[test]
    fn test_maven_style_canonical() {
        let canonical = Canonical::parse("maven:io.sentry:sentry").unwrap();
        assert_eq!(canonical.segments(), &["io.sentry".to_string(), "sentry".to_string()]);
        assert_eq!(
            canonical.package_dir(Path::new("/data")),
            PathBuf::from("/data/packages/maven/io.sentry/sentry")
        );
    }

    #[test]
    fn test_missing_colon_is_rejected() {
        let err = Canonical::parse("sentry-sdk").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidCanonical(_)));
    }

    #[test]
    fn test_traversal_is_rejected() {
        assert!(Canonical::parse("npm:../../etc").is_err());
        assert!(Canonical::parse("..:passwd").is_err());
        assert!(Canonical::parse("npm:").is_err());
        assert!(Canonical::parse("npm:@sentry//react").is_err());
    }

    #[test]
    fn test_version_path() {
        let canonical = Canonical::parse("npm:@sentry/browser").unwrap();
        let path = canonical.version_path(Path::new("/r"), "7.0.0").unwrap();
        assert_eq!(path, PathBuf::from("/r/packages/npm/@sentry/browser/7.0.0.json"));
        assert!(canonical.version_path(Path::new("/r"), "..").is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let canonical: Canonical = serde_json::from_str("\"npm:@sentry:node\"").unwrap();
        assert_eq!(serde_json::to_string(&canonical).unwrap(), "\"npm:@sentry/node\"");
    }
}
