//! On-disk layout of an artifact directory
//!
//! ```text
//! <root>/
//!   <id>/<id>.json           canonical document
//!   .metadata/.index.json    uuid -> id
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::error::{Result, StoreError};

pub const METADATA_DIR: &str = ".metadata";
pub const INDEX_FILE: &str = ".index.json";
const JSON_EXTENSION: &str = "json";

/// Reject ids that cannot name a single directory below the root
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(StoreError::invalid("invalid artifact id: id is empty"));
    }
    if id.contains('/') || id.contains('\\') {
        return Err(StoreError::invalid(format!(
            "invalid artifact id: {id:?} contains a path separator"
        )));
    }
    if id == "." || id == ".." {
        return Err(StoreError::invalid(format!(
            "invalid artifact id: {id:?} is not a directory name"
        )));
    }
    Ok(())
}

/// Directory holding every file of the artifact
pub fn artifact_dir(root: &Path, id: &str) -> Result<PathBuf> {
    validate_id(id)?;
    Ok(root.join(id))
}

/// `<root>/<id>/<id>.json`
pub fn artifact_file(root: &Path, id: &str) -> Result<PathBuf> {
    Ok(artifact_dir(root, id)?.join(format!("{id}.{JSON_EXTENSION}")))
}

/// File that reference scans for `id` must ignore, so an artifact never references itself
pub fn self_match_path(root: &Path, id: &str) -> Result<PathBuf> {
    artifact_file(root, id)
}

pub fn metadata_dir(root: &Path) -> PathBuf {
    root.join(METADATA_DIR)
}

pub fn index_file(root: &Path) -> PathBuf {
    metadata_dir(root).join(INDEX_FILE)
}

/// A first-level directory of the root, named after the artifact it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub id: String,
    pub directory: PathBuf,
    pub file: PathBuf,
}

impl ArtifactEntry {
    fn new(directory: PathBuf, id: String) -> Self {
        let file = directory.join(format!("{id}.{JSON_EXTENSION}"));
        Self {
            id,
            directory,
            file,
        }
    }

    /// Whether the canonical document has been written yet
    pub fn is_materialized(&self) -> bool {
        self.file.is_file()
    }
}

/// List artifact directories of `root`, sorted by name
///
/// Dot-prefixed entries and plain files are skipped. A missing root yields
/// no entries.
pub fn list_entries(root: &Path) -> Result<Vec<ArtifactEntry>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop"));
            StoreError::io(path, source)
        })?;

        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || !entry.file_type().is_dir() {
            continue;
        }

        entries.push(ArtifactEntry::new(entry.into_path(), name));
    }

    Ok(entries)
}

/// Read a whole file
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| StoreError::io(path, e))
}

/// Replace `path` with `bytes` in one rename so readers never see a partial file
pub fn write_whole(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    fs::write(&tmp, bytes).map_err(|e| StoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::io(path, e)
    })
}

/// Delete a file or directory
pub fn delete(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| StoreError::io(path, e))
}
