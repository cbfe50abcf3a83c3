//! API Integration Tests
//!
//! Drives a running server over HTTP against the sample registry tree.

mod common;

use common::{assert_status, parse_json, TestApp};
use release_registry_api::{CacheConfig, MiddlewareConfig};
use release_registry_store::fixtures::{
    write_json, SAMPLE_CLI_DIGEST, SAMPLE_CLI_LINUX_URL, SAMPLE_CLI_WINDOWS_URL,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_healthz() {
    let app = TestApp::new().await;
    let response = app.get("/healthz").await;

    assert_status(&response, StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(response.text().await.unwrap(), "ok\n");
}

#[tokio::test]
async fn test_incoming_request_id_is_echoed() {
    let app = TestApp::new().await;
    let response = app
        .client()
        .get(format!("{}/sdks", app.url()))
        .header("x-request-id", "deploy-check-7")
        .send()
        .await
        .unwrap();

    assert_status(&response, StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "deploy-check-7");
}

#[tokio::test]
async fn test_packages_listing_and_lookup() {
    let app = TestApp::new().await;

    let packages: Value = parse_json(app.get("/packages").await).await;
    let names: Vec<&str> = packages.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["npm:@sentry/node", "npm:@sentry/react", "pypi:sentry-sdk"]);

    let entry: Value = parse_json(app.get("/packages/npm:@sentry/react/7.0.0").await).await;
    assert_eq!(entry["canonical"], "npm:@sentry/react");
    assert_eq!(entry["version"], "7.0.0");

    let versions: Value = parse_json(app.get("/packages/pypi:sentry-sdk/versions").await).await;
    assert_eq!(versions["versions"], json!(["1.0.0", "1.9.0", "1.10.0"]));
    assert_eq!(versions["latest"]["version"], "1.10.0");
}

#[tokio::test]
async fn test_missing_records_are_404_with_json_body() {
    let app = TestApp::new().await;
    let root = app.registry.path().to_str().unwrap();

    for path in [
        "/packages/pypi:sentry-sdk/0.0.1",
        "/packages/cargo:nothing/latest",
        "/sdks/sentry.nope/latest",
        "/apps/nope/latest",
        "/marketing-slugs/nope",
        "/no/such/route",
    ] {
        let response = app.get(path).await;
        assert_status(&response, StatusCode::NOT_FOUND);
        let body: Value = parse_json(response).await;
        assert_eq!(body["status"], 404);
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains(root), "{}: {}", path, message);
    }
}

#[tokio::test]
async fn test_strict_listing_reports_inconsistency() {
    let app = TestApp::new().await;

    assert_status(&app.get("/packages?strict=true").await, StatusCode::INTERNAL_SERVER_ERROR);
    assert_status(&app.get("/sdks?strict=YES").await, StatusCode::INTERNAL_SERVER_ERROR);
    assert_status(&app.get("/sdks?strict=no").await, StatusCode::OK);
}

#[tokio::test]
async fn test_sdks() {
    let app = TestApp::new().await;

    let sdks: Value = parse_json(app.get("/sdks").await).await;
    assert_eq!(sdks["sentry.python"]["version"], "1.10.0");
    assert_eq!(sdks["sentry.javascript.react"]["canonical"], "npm:@sentry/react");
    assert!(sdks.get("sentry.ghost").is_none());

    let entry: Value = parse_json(app.get("/sdks/sentry.python/1.9.0").await).await;
    assert_eq!(entry["version"], "1.9.0");

    let versions: Value = parse_json(app.get("/sdks/sentry.javascript.react/versions").await).await;
    assert_eq!(versions["versions"], json!(["7.0.0", "7.1.0"]));
}

#[tokio::test]
async fn test_app_download_redirects() {
    let app = TestApp::new().await;

    let response = app
        .get("/apps/sentry-cli/latest?response=download&package=sentry-cli&arch=x86_64&platform=Linux")
        .await;
    assert_status(&response, StatusCode::FOUND);
    assert_eq!(response.headers()["location"], SAMPLE_CLI_LINUX_URL);
    assert_eq!(response.headers()["digest"], SAMPLE_CLI_DIGEST);

    // matching ignores case and `_`/`-`; no checksums means no Digest
    let response = app
        .get("/apps/sentry-cli/2.20.6?response=download&package=Sentry-CLI&arch=x86-64&platform=windows")
        .await;
    assert_status(&response, StatusCode::FOUND);
    assert_eq!(response.headers()["location"], SAMPLE_CLI_WINDOWS_URL);
    assert!(!response.headers().contains_key("digest"));
}

#[tokio::test]
async fn test_app_download_errors() {
    let app = TestApp::new().await;

    let response = app
        .get("/apps/sentry-cli/latest?response=download&package=sentry-cli&platform=Linux")
        .await;
    assert_status(&response, StatusCode::BAD_REQUEST);

    let response = app
        .get("/apps/sentry-cli/latest?response=download&package=sentry-cli&arch=mips&platform=Linux")
        .await;
    assert_status(&response, StatusCode::NOT_FOUND);

    let response = app
        .get("/apps/sentry-cli/1.0.0?response=download&package=sentry-cli&arch=x86_64&platform=Linux")
        .await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_apps_listing_and_entry() {
    let app = TestApp::new().await;

    let apps: Value = parse_json(app.get("/apps").await).await;
    assert_eq!(apps["sentry-cli"]["version"], "2.20.6");

    let entry: Value = parse_json(app.get("/apps/sentry-cli/2.20.5").await).await;
    assert_eq!(entry["version"], "2.20.5");
}

#[tokio::test]
async fn test_marketing_slugs() {
    let app = TestApp::new().await;

    let list: Value = parse_json(app.get("/marketing-slugs").await).await;
    assert_eq!(
        list["slugs"],
        json!(["dangling", "docs", "express", "flask", "python", "react-package"])
    );

    let python: Value = parse_json(app.get("/marketing-slugs/python").await).await;
    assert_eq!(python["target"]["canonical"], "pypi:sentry-sdk");

    let express: Value = parse_json(app.get("/marketing-slugs/express").await).await;
    assert_eq!(express["target"]["integration"], "express");
    assert_eq!(express["target"]["package"]["canonical"], "npm:@sentry/node");

    let docs: Value = parse_json(app.get("/marketing-slugs/docs").await).await;
    assert_eq!(docs["definition"]["type"], "other");
    assert!(docs["target"].is_null());
}

#[tokio::test]
async fn test_lambda_layers() {
    let app = TestApp::new().await;

    let layers: Value = parse_json(app.get("/aws-lambda-layers").await).await;
    let keys: Vec<&str> = layers.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["aws-layer:node", "aws-layer:python"]);
}

#[tokio::test]
async fn test_record_fields_keep_document_order() {
    let app = TestApp::new().await;
    write_json(
        app.registry.path(),
        "packages/npm/@sentry/node/7.2.0.json",
        &json!({"version": "7.2.0", "canonical": "npm:@sentry/node", "zeta": 1, "alpha": 2}),
    );

    let response = app.get("/packages/npm:@sentry/node/7.2.0").await;
    let text = response.text().await.unwrap();
    let positions: Vec<usize> = ["\"version\"", "\"canonical\"", "\"zeta\"", "\"alpha\""]
        .iter()
        .map(|key| text.find(key).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}

#[tokio::test]
async fn test_response_cache() {
    let config = MiddlewareConfig::new().with_cache(CacheConfig::default().with_enabled(true));
    let app = TestApp::with_config(config).await;

    let first = app.get("/sdks").await;
    assert!(!first.headers().contains_key("x-from-cache"));

    let second = app.get("/sdks").await;
    assert_eq!(second.headers()["x-from-cache"], "1");

    for path in ["/healthz", "/apps/sentry-cli/latest"] {
        app.get(path).await;
        let again = app.get(path).await;
        assert!(!again.headers().contains_key("x-from-cache"), "{}", path);
    }
}
