//! Deploy manifest generation
//!
//! Walks an asset directory and fingerprints every file with SHA-256,
//! producing the resource table a deployed build ships with. The entry
//! document gets a `"/"` alias so root requests resolve to the same
//! fingerprint.

use crate::error::{HuskError, HuskResult};
use crate::manifest::{Fingerprint, ResourceKey, ResourceManifest};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Collect every regular file under `dir`, skipping hidden entries
pub fn collect_files(dir: &Path) -> HuskResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(HuskError::PathNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current)
            .map_err(|e| HuskError::io(format!("reading directory {}", current.display()), e))?;

        for entry in entries {
            let entry =
                entry.map_err(|e| HuskError::io("reading asset directory entry", e))?;
            let path = entry.path();

            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Fingerprint a file's contents with SHA-256, hex-encoded
pub fn fingerprint_file(path: &Path) -> HuskResult<Fingerprint> {
    let contents = fs::read(path)
        .map_err(|e| HuskError::io(format!("reading asset {}", path.display()), e))?;

    let digest = Sha256::digest(&contents);
    Ok(Fingerprint::new(hex::encode(digest)))
}

/// Resource key for a file relative to the asset root, `/`-separated
pub fn relative_key(dir: &Path, path: &Path) -> ResourceKey {
    let rel = path.strip_prefix(dir).unwrap_or(path);
    let key = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    ResourceKey::new(key)
}

/// Alias `"/"` to the entry document's fingerprint, if it is present
pub fn alias_root(manifest: &mut ResourceManifest, entry_doc: &str) {
    if let Some(fingerprint) = manifest.get(&ResourceKey::new(entry_doc)).cloned() {
        manifest.insert(ResourceKey::root(), fingerprint);
    }
}

/// Scan an asset directory into a resource manifest
pub fn scan_assets(dir: &Path, entry_doc: &str) -> HuskResult<ResourceManifest> {
    let mut manifest = ResourceManifest::new();

    for path in collect_files(dir)? {
        let key = relative_key(dir, &path);
        let fingerprint = fingerprint_file(&path)?;
        manifest.insert(key, fingerprint);
    }

    alias_root(&mut manifest, entry_doc);
    debug!(
        "Scanned {} into {} resources",
        dir.display(),
        manifest.len()
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, contents: &[u8]) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn scan_produces_relative_keys() {
        let dir = TempDir::new().unwrap();
        write(&dir, "index.html", b"<html>");
        write(&dir, "assets/app.js", b"js");

        let manifest = scan_assets(dir.path(), "index.html").unwrap();

        assert!(manifest.contains(&ResourceKey::new("index.html")));
        assert!(manifest.contains(&ResourceKey::new("assets/app.js")));
    }

    #[test]
    fn scan_aliases_root_to_entry_document() {
        let dir = TempDir::new().unwrap();
        write(&dir, "index.html", b"<html>");

        let manifest = scan_assets(dir.path(), "index.html").unwrap();

        assert_eq!(
            manifest.get(&ResourceKey::root()),
            manifest.get(&ResourceKey::new("index.html"))
        );
    }

    #[test]
    fn scan_skips_hidden_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".DS_Store", b"junk");
        write(&dir, "a.js", b"js");

        let manifest = scan_assets(dir.path(), "index.html").unwrap();
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.js", b"one");
        write(&dir, "b.js", b"one");
        write(&dir, "c.js", b"two");

        let manifest = scan_assets(dir.path(), "index.html").unwrap();
        let a = manifest.get(&ResourceKey::new("a.js")).unwrap();
        let b = manifest.get(&ResourceKey::new("b.js")).unwrap();
        let c = manifest.get(&ResourceKey::new("c.js")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn scan_missing_dir_errors() {
        let dir = TempDir::new().unwrap();
        let result = scan_assets(&dir.path().join("absent"), "index.html");
        assert!(matches!(result, Err(HuskError::PathNotFound(_))));
    }
}
