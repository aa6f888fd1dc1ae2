//! Advisory uuid -> id side index stored in `.metadata/.index.json`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::codec::DocumentCodec;
use super::error::{Result, StoreError};
use super::layout;

/// Side file mapping a stable uuid to the current artifact id
///
/// The index can be missing or stale; it never decides whether an artifact
/// exists.
#[derive(Debug, Clone)]
pub struct UuidIndex {
    path: PathBuf,
    codec: DocumentCodec,
}

impl UuidIndex {
    /// Index of the artifacts stored under `root`
    pub fn for_root(root: &Path) -> Self {
        Self {
            path: layout::index_file(root),
            codec: DocumentCodec::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Current mapping, or `None` when the index has not been created
    pub fn read(&self) -> Result<Option<BTreeMap<String, String>>> {
        if !self.exists() {
            return Ok(None);
        }
        let bytes = layout::read(&self.path)?;
        let map = self
            .codec
            .from_json_to_map(&bytes)
            .map_err(|source| StoreError::Decode {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(map))
    }

    /// Id registered for `uuid`
    pub fn get(&self, uuid: &str) -> Result<Option<String>> {
        Ok(self.read()?.and_then(|mut map| map.remove(uuid)))
    }

    /// Register `uuid` as pointing at `id`, creating the index if needed
    pub fn put(&self, uuid: &str, id: &str) -> Result<()> {
        let mut map = self.read()?.unwrap_or_default();
        if map.get(uuid).map(String::as_str) == Some(id) {
            return Ok(());
        }
        map.insert(uuid.to_string(), id.to_string());
        self.write(&map)
    }

    /// Drop every uuid pointing at `id`
    pub fn remove_id(&self, id: &str) -> Result<()> {
        let Some(mut map) = self.read()? else {
            return Ok(());
        };
        let before = map.len();
        map.retain(|_, target| target != id);
        if map.len() != before {
            self.write(&map)?;
        }
        Ok(())
    }

    fn write(&self, map: &BTreeMap<String, String>) -> Result<()> {
        let bytes = self
            .codec
            .to_json(map)
            .map_err(|source| StoreError::Encode {
                id: layout::INDEX_FILE.to_string(),
                source,
            })?;
        layout::write_whole(&self.path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_index_reads_as_none() {
        let temp = TempDir::new().unwrap();
        let index = UuidIndex::for_root(temp.path());
        assert!(!index.exists());
        assert!(index.read().unwrap().is_none());
        assert!(index.get("uuid-1").unwrap().is_none());
        index.remove_id("page-1").unwrap();
        assert!(!index.exists());
    }

    #[test]
    fn test_put_get_remove() {
        let temp = TempDir::new().unwrap();
        let index = UuidIndex::for_root(temp.path());

        index.put("uuid-1", "page-1").unwrap();
        index.put("uuid-2", "page-2").unwrap();
        index.put("uuid-1", "page-1-renamed").unwrap();

        assert!(temp.path().join(".metadata/.index.json").is_file());
        assert_eq!(index.get("uuid-1").unwrap().as_deref(), Some("page-1-renamed"));
        assert_eq!(index.read().unwrap().unwrap().len(), 2);

        index.remove_id("page-2").unwrap();
        assert!(index.get("uuid-2").unwrap().is_none());
        assert!(index.get("uuid-1").unwrap().is_some());
    }

    #[test]
    fn test_corrupt_index_is_a_decode_error() {
        let temp = TempDir::new().unwrap();
        let index = UuidIndex::for_root(temp.path());
        layout::write_whole(index.path(), b"[1, 2").unwrap();
        assert!(matches!(index.read(), Err(StoreError::Decode { .. })));
    }
}
