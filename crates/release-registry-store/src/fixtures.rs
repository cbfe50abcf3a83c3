//! Registry trees for tests
//!
//! Builds a small but complete registry below a temporary directory. Enabled
//! for this crate's tests and, through the `testing` feature, for the tests of
//! dependent crates.

use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

/// Digest the sample `sentry-cli` Linux download is expected to carry
pub const SAMPLE_CLI_DIGEST: &str = "sha256=aGVsbG8=,md5=XUFAKrxLKna5cZ2REBfFkg==";

/// Linux download URL of the sample `sentry-cli` 2.20.6 release
pub const SAMPLE_CLI_LINUX_URL: &str =
    "https://downloads.sentry-cdn.com/sentry-cli/2.20.6/sentry-cli-Linux-x86_64";

/// Windows download URL of the sample `sentry-cli` 2.20.6 release
pub const SAMPLE_CLI_WINDOWS_URL: &str =
    "https://downloads.sentry-cdn.com/sentry-cli/2.20.6/sentry-cli-Windows-x86_64.exe";

/// Write `value` as JSON to `root/relative`, creating parent directories
pub fn write_json(root: &Path, relative: &str, value: &Value) {
    let body = serde_json::to_vec_pretty(value).expect("fixture serializes");
    write_file(root, relative, &body);
}

/// Write raw bytes to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, body: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture directory");
    }
    std::fs::write(&path, body).expect("write fixture file");
}

fn package(canonical: &str, name: &str, version: &str) -> Value {
    json!({
        "name": name,
        "canonical": canonical,
        "version": version,
        "package_url": format!("https://example.com/{}", canonical),
        "repo_url": "https://github.com/getsentry/sentry-sdks",
        "main_docs_url": "https://docs.sentry.io"
    })
}

fn write_package(root: &Path, dir: &str, canonical: &str, name: &str, versions: &[&str]) {
    for version in versions {
        write_json(
            root,
            &format!("packages/{}/{}.json", dir, version),
            &package(canonical, name, version),
        );
    }
    if let Some(latest) = versions.last() {
        write_json(
            root,
            &format!("packages/{}/latest.json", dir),
            &package(canonical, name, latest),
        );
    }
}

fn cli_release(version: &str) -> Value {
    let base = format!("https://downloads.sentry-cdn.com/sentry-cli/{}", version);
    json!({
        "name": "Sentry CLI",
        "canonical": "app:sentry-cli",
        "version": version,
        "file_urls": {
            "sentry-cli-Linux-x86_64": format!("{}/sentry-cli-Linux-x86_64", base),
            "sentry-cli-Darwin-universal": format!("{}/sentry-cli-Darwin-universal", base),
            "sentry-cli-Windows-x86_64.exe": format!("{}/sentry-cli-Windows-x86_64.exe", base)
        },
        "files": {
            "sentry-cli-Linux-x86_64": {
                "name": "sentry-cli-Linux-x86_64",
                "url": format!("{}/sentry-cli-Linux-x86_64", base),
                "checksums": {
                    "sha256-hex": "68656c6c6f",
                    "md5-base64": "XUFAKrxLKna5cZ2REBfFkg=="
                }
            },
            "sentry-cli-Windows-x86_64.exe": {
                "name": "sentry-cli-Windows-x86_64.exe",
                "url": format!("{}/sentry-cli-Windows-x86_64.exe", base)
            }
        }
    })
}

/// Build the sample registry.
///
/// Contents:
/// - packages `pypi:sentry-sdk` (1.0.0, 1.9.0, 1.10.0), `npm:@sentry/react`
///   (7.0.0, 7.1.0), `npm:@sentry/node` (7.1.0) and `npm:broken` whose
///   `latest.json` is not valid JSON
/// - SDKs `sentry.python`, `sentry.javascript.react` and `sentry.ghost`, the
///   last pointing at a package that does not exist
/// - app `sentry-cli` (2.20.5, 2.20.6)
/// - Lambda layers for `node` and `python`
/// - marketing slugs of every kind, including a dangling and an invalid one
pub fn sample_registry() -> TempDir {
    let dir = tempfile::tempdir().expect("create fixture root");
    let root = dir.path();

    write_package(
        root,
        "pypi/sentry-sdk",
        "pypi:sentry-sdk",
        "Sentry Python SDK",
        &["1.0.0", "1.9.0", "1.10.0"],
    );
    write_file(root, "packages/npm/@sentry/__NAMESPACE__", b"");
    write_package(
        root,
        "npm/@sentry/react",
        "npm:@sentry/react",
        "Sentry React SDK",
        &["7.0.0", "7.1.0"],
    );
    write_package(
        root,
        "npm/@sentry/node",
        "npm:@sentry/node",
        "Sentry Node SDK",
        &["7.1.0"],
    );
    write_file(root, "packages/npm/broken/latest.json", b"{ not json");
    write_file(root, "packages/README.md", b"registry data");

    for version in ["1.0.0", "1.9.0", "1.10.0", "latest"] {
        write_json(
            root,
            &format!("sdks/sentry.python/{}.json", version),
            &json!({"canonical": "pypi:sentry-sdk"}),
        );
    }
    for version in ["7.0.0", "7.1.0", "latest"] {
        write_json(
            root,
            &format!("sdks/sentry.javascript.react/{}.json", version),
            &json!({"canonical": "npm:@sentry/react"}),
        );
    }
    write_json(root, "sdks/sentry.ghost/latest.json", &json!({"canonical": "npm:@sentry/ghost"}));

    write_json(root, "apps/sentry-cli/2.20.5.json", &cli_release("2.20.5"));
    write_json(root, "apps/sentry-cli/2.20.6.json", &cli_release("2.20.6"));
    write_json(root, "apps/sentry-cli/latest.json", &cli_release("2.20.6"));

    write_json(
        root,
        "aws-lambda-layers/node/latest.json",
        &json!({
            "name": "Node",
            "canonical": "aws-layer:node",
            "sdk_version": "7.1.0",
            "account_number": "943013980633",
            "layer_name": "SentryNodeServerlessSDK",
            "regions": [{"region": "us-east-1", "version": "12"}]
        }),
    );
    write_json(
        root,
        "aws-lambda-layers/python/latest.json",
        &json!({
            "name": "Python",
            "canonical": "aws-layer:python",
            "sdk_version": "1.10.0",
            "account_number": "943013980633",
            "layer_name": "SentryPythonServerlessSDK",
            "regions": [{"region": "eu-central-1", "version": "7"}]
        }),
    );
    write_file(root, "aws-lambda-layers/README.md", b"layers");

    write_json(
        root,
        "misc/marketing-slugs.json",
        &json!({
            "python": {"type": "sdk", "target": "sentry.python"},
            "react-package": {"type": "package", "target": "npm:@sentry/react"},
            "flask": {"type": "integration", "sdk": "sentry.python", "integration": "flask"},
            "express": {"type": "integration", "package": "npm:@sentry/node", "integration": "express"},
            "dangling": {"type": "sdk", "target": "sentry.nope"},
            "docs": {"type": "other", "target": "https://docs.sentry.io"},
            "untyped": {"target": "sentry.python"}
        }),
    );

    dir
}
