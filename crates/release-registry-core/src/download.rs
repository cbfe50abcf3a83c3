//! Download URL matching for application releases
//!
//! App release files are named `<package>-<platform>-<arch>[.exe]`, e.g.
//! `sentry-cli-Linux-x86_64` or `relay-Windows-x86_64.exe`. A download request
//! names the package, platform and architecture; matching is case-insensitive
//! and treats `_` and `-` in package and architecture names alike.

use serde_json::{Map, Value};

use crate::entry::AppEntry;

/// Find the download URL for the requested package, architecture and platform.
///
/// Returns the URL exactly as stored in the record.
pub fn find_download_url<'a>(
    app: &'a AppEntry,
    package: &str,
    arch: &str,
    platform: &str,
) -> Option<&'a str> {
    let package = package.replace('_', "-").to_lowercase();
    let arch = arch.to_lowercase().replace('_', "-");
    let platform = platform.to_lowercase();

    app.file_urls()
        .find(|url| basename_matches(url, &package, &arch, &platform))
}

fn basename_matches(url: &str, package: &str, arch: &str, platform: &str) -> bool {
    let normalized = url.to_lowercase();
    let normalized = normalized.strip_suffix(".exe").unwrap_or(&normalized);
    let basename = normalized.rsplit('/').next().unwrap_or_default();

    let parts: Vec<&str> = basename.split('-').collect();
    if parts.len() <= 2 {
        return false;
    }

    let (name, tail) = parts.split_at(parts.len() - 2);
    name.join("-") == package && tail[1].replace('_', "-") == arch && tail[0] == platform
}

/// Checksums recorded for the file served at `url`, if any
pub fn url_checksums<'a>(app: &'a AppEntry, url: &str) -> Option<&'a Map<String, Value>> {
    app.files()
        .find(|file| file.url == url)
        .and_then(|file| file.checksums)
}
