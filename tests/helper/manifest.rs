//! Manifest fixtures

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Writes `manifest.json` with the given bundle map plus the listed bundle files
pub fn write_project(bundle: serde_json::Value, files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("manifest.json");
    let document = serde_json::json!({ "name": "fixture", "bundle": bundle });
    fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();

    for (name, content) in files {
        let file = temp_dir.path().join(name);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file, content).unwrap();
    }

    (temp_dir, path)
}
