//! File-backed registry store
//!
//! Reads records straight from the registry tree on every request. Only the
//! package list and the marketing slugs are loaded once, when the store is
//! opened.

use async_trait::async_trait;
use release_registry_core::canonical::{version_file_name, PACKAGES_DIR};
use release_registry_core::{
    validate_path_component, AppEntry, Canonical, LambdaLayerEntry, MarketingSlug, PackageEntry,
    LATEST, NAMESPACE_FILE_MARKER,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::repository::RegistryStore;

const SDKS_DIR: &str = "sdks";
const APPS_DIR: &str = "apps";
const LAMBDA_LAYERS_DIR: &str = "aws-lambda-layers";
const MARKETING_SLUGS_FILE: &str = "misc/marketing-slugs.json";

/// Registry store reading JSON records from a directory tree
#[derive(Debug)]
pub struct FileRegistryStore {
    root: PathBuf,
    canonicals: Vec<Canonical>,
    marketing_slugs: BTreeMap<String, MarketingSlug>,
}

impl FileRegistryStore {
    /// Open the registry rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let metadata = tokio::fs::metadata(&root)
            .await
            .map_err(|e| StoreError::InvalidRoot(format!("{}: {}", root.display(), e)))?;
        if !metadata.is_dir() {
            return Err(StoreError::InvalidRoot(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let canonicals = enumerate_packages(&root).await?;
        let marketing_slugs = load_marketing_slugs(&root).await;

        info!(
            root = %root.display(),
            packages = canonicals.len(),
            marketing_slugs = marketing_slugs.len(),
            "Opened registry"
        );

        Ok(Self {
            root,
            canonicals,
            marketing_slugs,
        })
    }

    /// Path of `<dir>/<id>/<version>.json` with both components validated
    fn record_path(&self, dir: &str, id: &str, version: &str) -> StoreResult<PathBuf> {
        validate_path_component(id)?;
        Ok(self.root.join(dir).join(id).join(version_file_name(version)?))
    }
}

#[async_trait]
impl RegistryStore for FileRegistryStore {
    fn package_canonicals(&self) -> &[Canonical] {
        &self.canonicals
    }

    async fn read_package(&self, canonical: &Canonical, version: &str) -> StoreResult<PackageEntry> {
        let path = canonical.version_path(&self.root, version)?;
        debug!(canonical = %canonical, version, "Reading package record");
        read_json(&path).await
    }

    async fn package_versions(&self, canonical: &Canonical) -> StoreResult<Vec<String>> {
        let dir = canonical.package_dir(&self.root);
        let latest = version_file_name(LATEST)?;
        let mut versions = Vec::new();

        for name in list_names(&dir).await? {
            if !name.ends_with(".json") || name == latest {
                continue;
            }
            match read_json::<PackageEntry>(&dir.join(&name)).await {
                Ok(entry) => versions.push(entry.version().to_string()),
                Err(e) => warn!(canonical = %canonical, file = %name, "Skipping version record: {}", e),
            }
        }

        Ok(versions)
    }

    async fn sdk_ids(&self) -> StoreResult<Vec<String>> {
        list_dirs(&self.root.join(SDKS_DIR)).await
    }

    async fn read_sdk_link(&self, sdk_id: &str, version: &str) -> StoreResult<Canonical> {
        let path = self.record_path(SDKS_DIR, sdk_id, version)?;
        let link: Map<String, Value> = read_json(&path).await?;
        let canonical = link
            .get("canonical")
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::Parse {
                path: path.display().to_string(),
                message: "missing string field `canonical`".to_string(),
            })?;
        Ok(Canonical::parse(canonical)?)
    }

    async fn app_ids(&self) -> StoreResult<Vec<String>> {
        list_dirs(&self.root.join(APPS_DIR)).await
    }

    async fn read_app(&self, app_id: &str, version: &str) -> StoreResult<AppEntry> {
        let path = self.record_path(APPS_DIR, app_id, version)?;
        debug!(app_id, version, "Reading app record");
        read_json(&path).await
    }

    async fn app_versions(&self, app_id: &str) -> StoreResult<Vec<String>> {
        validate_path_component(app_id)?;
        let dir = self.root.join(APPS_DIR).join(app_id);
        Ok(list_names(&dir)
            .await?
            .into_iter()
            .filter_map(|name| name.strip_suffix(".json").map(str::to_string))
            .filter(|version| version != LATEST)
            .collect())
    }

    async fn lambda_layer_runtimes(&self) -> StoreResult<Vec<String>> {
        list_dirs(&self.root.join(LAMBDA_LAYERS_DIR)).await
    }

    async fn read_lambda_layer(&self, runtime: &str) -> StoreResult<LambdaLayerEntry> {
        let path = self.record_path(LAMBDA_LAYERS_DIR, runtime, LATEST)?;
        read_json(&path).await
    }

    fn marketing_slugs(&self) -> &BTreeMap<String, MarketingSlug> {
        &self.marketing_slugs
    }

    async fn health(&self) -> StoreResult<()> {
        tokio::fs::read_dir(&self.root)
            .await
            .map(|_| ())
            .map_err(|e| StoreError::from_io(&self.root, e))
    }
}

/// Read and deserialize a JSON file
async fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StoreError::from_io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Sorted names of all entries in a directory
async fn list_names(dir: &Path) -> StoreResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| StoreError::from_io(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StoreError::from_io(dir, e))?
    {
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!(dir = %dir.display(), "Skipping non UTF-8 entry {:?}", name),
        }
    }
    names.sort();
    Ok(names)
}

/// Sorted names of the sub-directories of `dir`, following symlinks
async fn list_dirs(dir: &Path) -> StoreResult<Vec<String>> {
    let mut dirs = Vec::new();
    for name in list_names(dir).await? {
        if is_dir(&dir.join(&name)).await {
            dirs.push(name);
        }
    }
    Ok(dirs)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Walk `packages/` and collect every package canonical
async fn enumerate_packages(root: &Path) -> StoreResult<Vec<Canonical>> {
    let packages = root.join(PACKAGES_DIR);
    let registries = match list_dirs(&packages).await {
        Ok(registries) => registries,
        Err(e) if e.is_not_found() => {
            warn!(dir = %packages.display(), "No packages directory; registry has no packages");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut canonicals = Vec::new();
    for registry in registries {
        let registry_dir = packages.join(&registry);
        for item in list_dirs(&registry_dir).await? {
            let item_dir = registry_dir.join(&item);
            if tokio::fs::try_exists(item_dir.join(NAMESPACE_FILE_MARKER))
                .await
                .unwrap_or(false)
            {
                for name in list_dirs(&item_dir).await? {
                    canonicals.push(Canonical::scoped(&registry, &item, &name));
                }
            } else {
                canonicals.push(Canonical::unscoped(&registry, &item));
            }
        }
    }

    Ok(canonicals)
}

/// Load marketing slug definitions; a missing or broken file yields no slugs
async fn load_marketing_slugs(root: &Path) -> BTreeMap<String, MarketingSlug> {
    let path = root.join(MARKETING_SLUGS_FILE);
    let raw: Map<String, Value> = match read_json(&path).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Marketing slugs unavailable: {}", e);
            return BTreeMap::new();
        }
    };

    raw.into_iter()
        .filter_map(|(slug, definition)| {
            let parsed = match definition {
                Value::Object(fields) => MarketingSlug::from_fields(fields).map_err(|e| e.to_string()),
                other => Err(format!("expected an object, got {}", other)),
            };
            match parsed {
                Ok(definition) => Some((slug, definition)),
                Err(e) => {
                    warn!(slug = %slug, "Skipping marketing slug: {}", e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_registry;

    async fn open_sample() -> (tempfile::TempDir, FileRegistryStore) {
        let dir = sample_registry();
        let store = FileRegistryStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_rejects_missing_root() {
        let err = FileRegistryStore::open("/nonexistent/registry/root")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRoot(_)));
    }

    #[tokio::test]
    async fn test_open_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRegistryStore::open(dir.path()).await.unwrap();
        assert!(store.package_canonicals().is_empty());
        assert!(store.marketing_slugs().is_empty());
        assert!(store.sdk_ids().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_enumerates_scoped_and_unscoped_packages() {
        let (_dir, store) = open_sample().await;
        let names: Vec<String> = store
            .package_canonicals()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert!(names.contains(&"pypi:sentry-sdk".to_string()));
        assert!(names.contains(&"npm:@sentry/react".to_string()));
        assert!(names.contains(&"npm:@sentry/node".to_string()));
        assert!(!names.iter().any(|n| n.ends_with("@sentry")));
        assert!(!names.iter().any(|n| n.contains(NAMESPACE_FILE_MARKER)));
        // stray files next to registries are not packages
        assert!(!names.iter().any(|n| n.contains("README")));
    }

    #[tokio::test]
    async fn test_read_package_versions() {
        let (_dir, store) = open_sample().await;
        let canonical = Canonical::parse("npm:@sentry:react").unwrap();

        let latest = store.read_package(&canonical, LATEST).await.unwrap();
        assert_eq!(latest.version(), "7.1.0");

        let old = store.read_package(&canonical, "7.0.0").await.unwrap();
        assert_eq!(old.canonical(), "npm:@sentry/react");

        let mut versions = store.package_versions(&canonical).await.unwrap();
        versions.sort();
        assert_eq!(versions, vec!["7.0.0".to_string(), "7.1.0".to_string()]);
    }

    #[tokio::test]
    async fn test_read_package_missing_and_invalid() {
        let (_dir, store) = open_sample().await;
        let canonical = Canonical::parse("pypi:sentry-sdk").unwrap();

        assert!(store.read_package(&canonical, "9.9.9").await.unwrap_err().is_not_found());
        assert!(matches!(
            store.read_package(&canonical, "..").await.unwrap_err(),
            StoreError::InvalidPath(_)
        ));

        let broken = Canonical::parse("npm:broken").unwrap();
        assert!(matches!(
            store.read_package(&broken, LATEST).await.unwrap_err(),
            StoreError::Parse { .. }
        ));
    }

    #[tokio::test]
    async fn test_sdk_links() {
        let (_dir, store) = open_sample().await;
        let ids = store.sdk_ids().await.unwrap();
        assert!(ids.contains(&"sentry.python".to_string()));

        let canonical = store.read_sdk_link("sentry.python", LATEST).await.unwrap();
        assert_eq!(canonical.to_string(), "pypi:sentry-sdk");
        let canonical = store.read_sdk_link("sentry.python", "1.9.0").await.unwrap();
        assert_eq!(canonical.to_string(), "pypi:sentry-sdk");

        assert!(store
            .read_sdk_link("sentry.python", "0.0.1")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store
            .read_sdk_link("sentry.unknown", LATEST)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(matches!(
            store.read_sdk_link("../apps", LATEST).await.unwrap_err(),
            StoreError::InvalidPath(_)
        ));
    }

    #[tokio::test]
    async fn test_apps_and_layers() {
        let (_dir, store) = open_sample().await;
        assert_eq!(store.app_ids().await.unwrap(), vec!["sentry-cli".to_string()]);

        let app = store.read_app("sentry-cli", "2.20.5").await.unwrap();
        assert_eq!(app.str_field("version"), Some("2.20.5"));
        assert_eq!(
            store.app_versions("sentry-cli").await.unwrap(),
            vec!["2.20.5".to_string(), "2.20.6".to_string()]
        );
        assert!(store.app_versions("nope").await.unwrap_err().is_not_found());

        let runtimes = store.lambda_layer_runtimes().await.unwrap();
        assert_eq!(runtimes, vec!["node".to_string(), "python".to_string()]);

        let layer = store.read_lambda_layer("python").await.unwrap();
        assert_eq!(layer.canonical(), "aws-layer:python");
    }

    #[tokio::test]
    async fn test_marketing_slugs_loaded_once() {
        let (dir, store) = open_sample().await;
        assert!(store.marketing_slugs().contains_key("python"));
        // invalid definitions are dropped
        assert!(!store.marketing_slugs().contains_key("untyped"));

        std::fs::remove_file(dir.path().join(MARKETING_SLUGS_FILE)).unwrap();
        assert!(store.marketing_slugs().contains_key("python"));
    }

    #[tokio::test]
    async fn test_health() {
        let (dir, store) = open_sample().await;
        assert!(store.health().await.is_ok());
        drop(dir);
        assert!(store.health().await.is_err());
    }
}
