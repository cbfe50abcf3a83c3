//! Static snapshot builder
//!
//! Renders every endpoint of the registry into a directory of JSON files laid
//! out like the URL space, e.g. `packages/npm/@sentry/react/versions.json`,
//! so the registry can be served by a plain static file host.

use release_registry_core::canonical::version_file_name;
use release_registry_core::{validate_path_component, Canonical, LATEST};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::dto::SnapshotSummary;
use crate::error::{ServiceError, ServiceResult};
use crate::ServiceRegistry;

/// Builds a static snapshot of the registry
pub struct SnapshotBuilder {
    services: ServiceRegistry,
}

impl SnapshotBuilder {
    /// Create a builder reading through the given services
    pub fn new(services: ServiceRegistry) -> Self {
        Self { services }
    }

    /// Write the snapshot to `output_dir`, replacing its previous contents
    #[instrument(skip(self, output_dir), fields(output = %output_dir.display()))]
    pub async fn build(&self, output_dir: &Path) -> ServiceResult<SnapshotSummary> {
        match tokio::fs::remove_dir_all(output_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(output_dir).await?;

        let summary = SnapshotSummary {
            packages: self.write_packages(output_dir).await?,
            sdks: self.write_sdks(output_dir).await?,
            apps: self.write_apps(output_dir).await?,
            lambda_layers: self.write_layers(output_dir).await?,
            marketing_slugs: self.write_marketing_slugs(output_dir).await?,
        };

        info!(
            packages = summary.packages,
            sdks = summary.sdks,
            apps = summary.apps,
            lambda_layers = summary.lambda_layers,
            marketing_slugs = summary.marketing_slugs,
            "Snapshot written"
        );
        Ok(summary)
    }

    async fn write_packages(&self, output: &Path) -> ServiceResult<usize> {
        let packages = self.services.packages.list_packages(false).await?;
        write_json(&output.join("packages.json"), &packages).await?;

        let mut written = 0;
        for name in packages.keys() {
            let canonical = match Canonical::parse(name) {
                Ok(canonical) => canonical,
                Err(e) => {
                    warn!(canonical = %name, "Skipping package in snapshot: {}", e);
                    continue;
                }
            };
            match self.write_package_dir(&canonical.package_dir(output), name).await {
                Ok(()) => written += 1,
                Err(e) => warn!(canonical = %name, "Skipping package in snapshot: {}", e),
            }
        }
        Ok(written)
    }

    /// Write `latest.json`, `versions.json` and every version record of a package
    async fn write_package_dir(&self, dir: &Path, canonical: &str) -> ServiceResult<()> {
        let versions = self.services.packages.get_package_versions(canonical).await?;
        write_json(&dir.join(version_file_name(LATEST)?), &versions.latest).await?;
        write_json(&dir.join("versions.json"), &versions).await?;

        for version in &versions.versions {
            let path = match version_file_name(version) {
                Ok(file) => dir.join(file),
                Err(e) => {
                    warn!(canonical, version = %version, "Skipping version in snapshot: {}", e);
                    continue;
                }
            };
            match self.services.packages.get_package(canonical, version).await {
                Ok(entry) => write_json(&path, &entry).await?,
                Err(e) => warn!(canonical, version = %version, "Skipping version in snapshot: {}", e),
            }
        }
        Ok(())
    }

    async fn write_sdks(&self, output: &Path) -> ServiceResult<usize> {
        let sdks = self.services.sdks.list_sdks(false).await?;
        write_json(&output.join("sdks.json"), &sdks).await?;

        let mut written = 0;
        for (id, latest) in &sdks {
            let dir = match child_dir(output, "sdks", id) {
                Ok(dir) => dir,
                Err(e) => {
                    warn!(sdk = %id, "Skipping SDK in snapshot: {}", e);
                    continue;
                }
            };
            match self.write_package_dir(&dir, latest.canonical()).await {
                Ok(()) => written += 1,
                Err(e) => warn!(sdk = %id, "Skipping SDK in snapshot: {}", e),
            }
        }
        Ok(written)
    }

    async fn write_apps(&self, output: &Path) -> ServiceResult<usize> {
        let apps = self.services.apps.list_apps().await?;
        write_json(&output.join("apps.json"), &apps).await?;

        for (id, latest) in &apps {
            let dir = child_dir(output, "apps", id)?;
            write_json(&dir.join(version_file_name(LATEST)?), latest).await?;

            let versions = match self.services.store.app_versions(id).await {
                Ok(versions) => versions,
                Err(e) => {
                    warn!(app = %id, "Skipping app versions in snapshot: {}", e);
                    continue;
                }
            };
            for version in versions {
                match self.services.apps.get_app(id, &version).await {
                    Ok(app) => write_json(&dir.join(version_file_name(&version)?), &app).await?,
                    Err(e) => warn!(app = %id, version = %version, "Skipping app version in snapshot: {}", e),
                }
            }
        }
        Ok(apps.len())
    }

    async fn write_layers(&self, output: &Path) -> ServiceResult<usize> {
        let layers = self.services.layers.list_layers().await?;
        write_json(&output.join("aws-lambda-layers.json"), &layers).await?;
        Ok(layers.len())
    }

    async fn write_marketing_slugs(&self, output: &Path) -> ServiceResult<usize> {
        let list = self.services.marketing.list_slugs().await?;
        write_json(&output.join("marketing-slugs.json"), &list).await?;

        let mut written = 0;
        for slug in &list.slugs {
            let path = match version_file_name(slug) {
                Ok(file) => output.join("marketing-slugs").join(file),
                Err(e) => {
                    warn!(slug = %slug, "Skipping marketing slug in snapshot: {}", e);
                    continue;
                }
            };
            let resolved = self.services.marketing.resolve_slug(slug).await?;
            write_json(&path, &resolved).await?;
            written += 1;
        }
        Ok(written)
    }
}

/// `output/<kind>/<name>` with `name` validated as a single path component
fn child_dir(output: &Path, kind: &str, name: &str) -> ServiceResult<PathBuf> {
    validate_path_component(name)?;
    Ok(output.join(kind).join(name))
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ServiceResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec(value)?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| ServiceError::Storage(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use release_registry_store::fixtures::sample_registry;
    use release_registry_store::FileRegistryStore;
    use serde_json::Value;
    use std::sync::Arc;

    async fn builder() -> (tempfile::TempDir, SnapshotBuilder) {
        let dir = sample_registry();
        let store = FileRegistryStore::open(dir.path()).await.unwrap();
        let services = ServiceRegistry::new(Arc::new(store));
        (dir, SnapshotBuilder::new(services))
    }

    fn read(path: &Path) -> Value {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_build_writes_url_layout() {
        let (_registry, builder) = builder().await;
        let output = tempfile::tempdir().unwrap();

        let summary = builder.build(output.path()).await.unwrap();
        assert_eq!(
            summary,
            SnapshotSummary {
                packages: 3,
                sdks: 2,
                apps: 1,
                lambda_layers: 2,
                marketing_slugs: 6,
            }
        );

        let root = output.path();
        let packages = read(&root.join("packages.json"));
        assert_eq!(packages["npm:@sentry/react"]["version"], "7.1.0");

        let versions = read(&root.join("packages/npm/@sentry/react/versions.json"));
        assert_eq!(versions["versions"], serde_json::json!(["7.0.0", "7.1.0"]));
        assert_eq!(versions["latest"]["version"], "7.1.0");
        assert_eq!(read(&root.join("packages/pypi/sentry-sdk/1.9.0.json"))["version"], "1.9.0");

        assert_eq!(read(&root.join("sdks/sentry.python/latest.json"))["canonical"], "pypi:sentry-sdk");
        assert!(root.join("sdks/sentry.python/versions.json").exists());
        assert!(!root.join("sdks/sentry.ghost").exists());

        assert!(root.join("apps/sentry-cli/2.20.5.json").exists());
        assert!(root.join("aws-lambda-layers.json").exists());

        let slugs = read(&root.join("marketing-slugs.json"));
        assert_eq!(slugs["slugs"][0], "dangling");
        let flask = read(&root.join("marketing-slugs/flask.json"));
        assert_eq!(flask["target"]["integration"], "flask");
    }

    #[tokio::test]
    async fn test_build_clears_output() {
        let (_registry, builder) = builder().await;
        let output = tempfile::tempdir().unwrap();
        std::fs::write(output.path().join("stale.json"), b"{}").unwrap();

        builder.build(output.path()).await.unwrap();
        assert!(!output.path().join("stale.json").exists());
        assert!(output.path().join("packages.json").exists());
    }
}
