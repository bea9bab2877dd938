//! Project manifest with its `bundle` map of vendored files

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::version::error::{ManifestError, UpdateError};

/// Where a bundle lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleMeta {
    pub location: PathBuf,
}

/// A single vendored file tracked by the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Currently recorded version (a version string or a commit SHA)
    pub version: String,
    /// Upstream descriptor; entries without one are not third-party
    pub latest: Option<String>,
    /// Download from the raw GitHub URL instead of `latest` itself
    pub download: bool,
    /// Current file content
    pub content: String,
    pub meta: BundleMeta,
}

/// Bundle entry as written in the manifest JSON
#[derive(Debug, Deserialize)]
struct RawBundleEntry {
    #[serde(default, deserialize_with = "scalar_string")]
    version: String,
    latest: Option<String>,
    #[serde(default)]
    download: bool,
    file: Option<PathBuf>,
}

/// Accepts numbers and booleans as version strings (`"version": 2` -> `"2"`)
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a version string, found {}",
            other
        ))),
    }
}

#[derive(Debug)]
pub struct Manifest {
    path: Option<PathBuf>,
    source: String,
    document: Value,
    bundle: IndexMap<String, BundleEntry>,
}

impl Manifest {
    /// Loads a manifest and the current content of each bundle file.
    ///
    /// Bundle locations are resolved against the manifest's directory.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let source = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        Self::parse(source, base_dir, Some(path.to_path_buf()))
    }

    /// Builds a manifest from JSON text that has no file behind it.
    pub fn from_source(source: &str, base_dir: &Path) -> Result<Self, ManifestError> {
        Self::parse(source.to_string(), base_dir, None)
    }

    fn parse(
        source: String,
        base_dir: &Path,
        path: Option<PathBuf>,
    ) -> Result<Self, ManifestError> {
        let document: Value = serde_json::from_str(&source)?;
        let raw_bundle = document
            .get("bundle")
            .and_then(Value::as_object)
            .ok_or(ManifestError::MissingBundle)?;

        let mut bundle = IndexMap::new();
        for (key, value) in raw_bundle {
            let raw: RawBundleEntry = match serde_json::from_value(value.clone()) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Skipping bundle {}: {}", key, e);
                    continue;
                }
            };
            let location = base_dir.join(raw.file.unwrap_or_else(|| PathBuf::from(key)));
            let content = fs::read_to_string(&location).unwrap_or_else(|e| {
                debug!(
                    "No readable bundle file for {} at {}: {}",
                    key,
                    location.display(),
                    e
                );
                String::new()
            });

            bundle.insert(
                key.clone(),
                BundleEntry {
                    version: raw.version,
                    latest: raw.latest,
                    download: raw.download,
                    content,
                    meta: BundleMeta { location },
                },
            );
        }

        Ok(Self {
            path,
            source,
            document,
            bundle,
        })
    }

    /// Manifest file path; `None` when built in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Manifest JSON text as last loaded or written
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bundle(&self) -> &IndexMap<String, BundleEntry> {
        &self.bundle
    }

    pub fn entry(&self, key: &str) -> Option<&BundleEntry> {
        self.bundle.get(key)
    }

    /// Manifest text with `key`'s version replaced, 2-space indented
    fn render_with_version(
        &self,
        key: &str,
        version: &str,
    ) -> Result<(String, Value), UpdateError> {
        let mut document = self.document.clone();
        if let Some(entry) = document
            .get_mut("bundle")
            .and_then(|bundle| bundle.get_mut(key))
            .and_then(Value::as_object_mut)
        {
            entry.insert("version".to_string(), Value::String(version.to_string()));
        }
        let text = serde_json::to_string_pretty(&document)?;
        Ok((text, document))
    }

    /// Writes the new bundle content and manifest, then records them in memory.
    ///
    /// Both files are staged next to their targets and renamed into place, bundle
    /// first. Memory is only updated once both renames succeed; if the manifest
    /// rename fails after the bundle rename, the bundle file is already new.
    pub fn persist_update(
        &mut self,
        key: &str,
        version: &str,
        content: &str,
    ) -> Result<(), UpdateError> {
        let Some(location) = self.bundle.get(key).map(|entry| entry.meta.location.clone()) else {
            warn!("Ignoring update for unknown bundle {}", key);
            return Ok(());
        };
        let (source, document) = self.render_with_version(key, version)?;

        if let Some(manifest_path) = self.path.clone() {
            write_pair(&location, content, &manifest_path, &source)?;
        }

        self.source = source;
        self.document = document;
        if let Some(entry) = self.bundle.get_mut(key) {
            entry.version = version.to_string();
            entry.content = content.to_string();
        }
        Ok(())
    }
}

fn write_pair(
    bundle_path: &Path,
    bundle_text: &str,
    manifest_path: &Path,
    manifest_text: &str,
) -> Result<(), UpdateError> {
    let bundle_tmp = stage(bundle_path, bundle_text)?;
    let manifest_tmp = match stage(manifest_path, manifest_text) {
        Ok(tmp) => tmp,
        Err(e) => {
            let _ = fs::remove_file(&bundle_tmp);
            return Err(e);
        }
    };

    if let Err(source) = fs::rename(&bundle_tmp, bundle_path) {
        let _ = fs::remove_file(&bundle_tmp);
        let _ = fs::remove_file(&manifest_tmp);
        return Err(UpdateError::FileWrite {
            path: bundle_path.to_path_buf(),
            source,
        });
    }

    fs::rename(&manifest_tmp, manifest_path).map_err(|source| {
        let _ = fs::remove_file(&manifest_tmp);
        UpdateError::FileWrite {
            path: manifest_path.to_path_buf(),
            source,
        }
    })
}

/// Writes `contents` to a temporary sibling of `path` and returns its path
fn stage(path: &Path, contents: &str) -> Result<PathBuf, UpdateError> {
    let file_write = |source| UpdateError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(file_write)?;
    }

    let mut file_name = path.file_name().unwrap_or_default().to_os_string();
    file_name.push(".tmp");
    let tmp = path.with_file_name(file_name);

    fs::write(&tmp, contents).map_err(file_write)?;
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "name": "demo",
  "bundle": {
    "jquery": {
      "version": "3.6.0",
      "latest": "https://code.jquery.com/jquery.js",
      "file": "vendor/jquery.js",
      "comment": "keep me"
    },
    "app.js": {
      "version": "1.0.0"
    }
  },
  "output": "dist"
}"#;

    fn write_manifest(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("manifest.json");
        fs::write(&path, MANIFEST).unwrap();
        fs::create_dir_all(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/jquery.js"), "/*! jQuery v3.6.0 */").unwrap();
        path
    }

    #[test]
    fn load_resolves_locations_and_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir);

        let manifest = Manifest::load(&path).unwrap();

        assert_eq!(manifest.path(), Some(path.as_path()));
        assert_eq!(manifest.source(), MANIFEST);

        let jquery = manifest.entry("jquery").unwrap();
        assert_eq!(jquery.version, "3.6.0");
        assert_eq!(
            jquery.latest.as_deref(),
            Some("https://code.jquery.com/jquery.js")
        );
        assert!(!jquery.download);
        assert_eq!(jquery.content, "/*! jQuery v3.6.0 */");
        assert_eq!(jquery.meta.location, dir.path().join("vendor/jquery.js"));

        let app = manifest.entry("app.js").unwrap();
        assert_eq!(app.latest, None);
        assert_eq!(app.content, "");
        assert_eq!(app.meta.location, dir.path().join("app.js"));
    }

    #[test]
    fn load_keeps_bundle_order() {
        let dir = TempDir::new().unwrap();
        let manifest = Manifest::load(&write_manifest(&dir)).unwrap();

        let keys: Vec<_> = manifest.bundle().keys().cloned().collect();
        assert_eq!(keys, vec!["jquery".to_string(), "app.js".to_string()]);
    }

    #[test]
    fn load_skips_malformed_entries_and_keeps_the_rest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            r#"{"bundle": {
                "numeric.js": {"version": 2, "latest": "https://cdn.test/numeric.js"},
                "flag.js": {"version": "1.0.0", "latest": "https://cdn.test/flag.js", "download": "yes"},
                "nested.js": {"version": {"major": 1}},
                "fine.js": {"version": "1.0.0", "latest": "https://cdn.test/fine.js"}
            }}"#,
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();

        let keys: Vec<_> = manifest.bundle().keys().cloned().collect();
        assert_eq!(keys, vec!["numeric.js".to_string(), "fine.js".to_string()]);
        assert_eq!(manifest.entry("numeric.js").unwrap().version, "2");
        assert_eq!(manifest.entry("fine.js").unwrap().version, "1.0.0");
    }

    #[test]
    fn load_fails_without_bundle_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, r#"{"name": "demo"}"#).unwrap();

        assert!(matches!(
            Manifest::load(&path),
            Err(ManifestError::MissingBundle)
        ));
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = TempDir::new().unwrap();

        assert!(matches!(
            Manifest::load(&dir.path().join("nope.json")),
            Err(ManifestError::Read { .. })
        ));
    }

    #[test]
    fn from_source_has_no_path() {
        let manifest = Manifest::from_source(MANIFEST, Path::new("/nonexistent")).unwrap();

        assert_eq!(manifest.path(), None);
        assert_eq!(manifest.bundle().len(), 2);
    }

    #[test]
    fn persist_update_writes_both_files_and_preserves_other_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir);
        let mut manifest = Manifest::load(&path).unwrap();

        manifest
            .persist_update("jquery", "3.7.1", "/*! jQuery v3.7.1 */")
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, manifest.source());
        let expected = MANIFEST.replace("\"3.6.0\"", "\"3.7.1\"");
        assert_eq!(written, expected);
        assert_eq!(
            fs::read_to_string(dir.path().join("vendor/jquery.js")).unwrap(),
            "/*! jQuery v3.7.1 */"
        );

        let jquery = manifest.entry("jquery").unwrap();
        assert_eq!(jquery.version, "3.7.1");
        assert_eq!(jquery.content, "/*! jQuery v3.7.1 */");
        assert!(!dir.path().join("manifest.json.tmp").exists());
        assert!(!dir.path().join("vendor/jquery.js.tmp").exists());
    }

    #[test]
    fn persist_update_leaves_memory_and_manifest_untouched_when_bundle_write_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_manifest(&dir);
        let mut manifest = Manifest::load(&path).unwrap();
        // A directory at the bundle location makes the rename fail
        fs::remove_file(dir.path().join("vendor/jquery.js")).unwrap();
        fs::create_dir_all(dir.path().join("vendor/jquery.js/inner")).unwrap();

        let result = manifest.persist_update("jquery", "3.7.1", "new");

        assert!(matches!(result, Err(UpdateError::FileWrite { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), MANIFEST);
        assert_eq!(manifest.entry("jquery").unwrap().version, "3.6.0");
        assert_eq!(manifest.source(), MANIFEST);
        assert!(!dir.path().join("manifest.json.tmp").exists());
    }

    #[test]
    fn persist_update_without_path_only_updates_memory() {
        let mut manifest = Manifest::from_source(MANIFEST, Path::new("/nonexistent")).unwrap();

        manifest.persist_update("jquery", "3.7.1", "new").unwrap();

        assert_eq!(manifest.entry("jquery").unwrap().version, "3.7.1");
        assert!(manifest.source().contains("\"3.7.1\""));
    }
}
