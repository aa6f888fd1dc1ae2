//! Persistence of artifacts as JSON files

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::codec::DocumentCodec;
use super::diagnostics::{default_sink, SharedSink};
use super::error::{Result, StoreError};
use super::index::UuidIndex;
use super::layout;
use super::loader::JsonFileLoader;
use super::model::Artifact;

/// Read/write access to artifacts by id
pub trait Repository {
    type Artifact: Artifact;

    fn get(&self, id: &str) -> Result<Self::Artifact>;
    fn save(&self, artifact: &Self::Artifact) -> Result<()>;

    /// Stamp the modification time, then save
    fn update_last_update_and_save(&self, artifact: &mut Self::Artifact) -> Result<()> {
        artifact.set_last_update(Utc::now().timestamp_millis());
        self.save(artifact)
    }
}

impl<R: Repository + ?Sized> Repository for &R {
    type Artifact = R::Artifact;

    fn get(&self, id: &str) -> Result<Self::Artifact> {
        (**self).get(id)
    }

    fn save(&self, artifact: &Self::Artifact) -> Result<()> {
        (**self).save(artifact)
    }
}

/// Artifacts of type `T` stored under one root directory
pub struct JsonFileRepository<T> {
    root: PathBuf,
    codec: DocumentCodec,
    loader: JsonFileLoader<T>,
    index: UuidIndex,
}

impl<T: Artifact> JsonFileRepository<T> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, DocumentCodec::default(), default_sink())
    }

    pub fn with_options(root: impl Into<PathBuf>, codec: DocumentCodec, sink: SharedSink) -> Self {
        let root = root.into();
        Self {
            index: UuidIndex::for_root(&root),
            loader: JsonFileLoader::new(codec, sink),
            codec,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &UuidIndex {
        &self.index
    }

    pub fn find(&self, id: &str) -> Result<Option<T>> {
        self.loader.find(&self.root, id)
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(layout::artifact_file(&self.root, id)?.is_file())
    }

    pub fn get_all(&self) -> Result<Vec<T>> {
        self.loader.get_all(&self.root)
    }

    /// Remove the artifact directory and its index entries
    pub fn delete(&self, id: &str) -> Result<()> {
        let dir = layout::artifact_dir(&self.root, id)?;
        if !dir.is_dir() {
            return Err(StoreError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        layout::delete(&dir)?;
        self.index.remove_id(id)?;
        tracing::info!(kind = T::KIND, id, "deleted artifact");
        Ok(())
    }

    pub fn get_by_uuid(&self, uuid: &str) -> Result<Option<T>> {
        self.loader.get_by_uuid(&self.root, uuid)
    }

    /// Artifacts of this repository referencing `id`
    pub fn find_by_object_id(&self, id: &str) -> Result<Vec<T>> {
        self.loader.find_by_object_id(&self.root, id)
    }

    pub fn find_by_object_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<HashMap<String, Vec<T>>> {
        self.loader.find_by_object_ids(&self.root, ids)
    }

    /// Whether any other artifact of this repository mentions `id`
    pub fn contains_reference(&self, id: &str) -> Result<bool> {
        self.loader.contains(&self.root, id)
    }
}

impl<T: Artifact> Repository for JsonFileRepository<T> {
    type Artifact = T;

    fn get(&self, id: &str) -> Result<T> {
        self.loader.get(&self.root, id)
    }

    fn save(&self, artifact: &T) -> Result<()> {
        let id = artifact.id();
        let path = layout::artifact_file(&self.root, id)?;
        let bytes = self
            .codec
            .to_json(artifact)
            .map_err(|source| StoreError::Encode {
                id: id.to_string(),
                source,
            })?;
        layout::write_whole(&path, &bytes)?;

        if let Some(uuid) = artifact.uuid() {
            self.index.put(uuid, id)?;
        }

        tracing::info!(kind = T::KIND, id, "saved artifact: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Fragment, Page};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_save_writes_canonical_file() {
        let temp = TempDir::new().unwrap();
        let repository = JsonFileRepository::<Page>::new(temp.path());
        let page = Page::new("page-1", "Home");

        repository.save(&page).unwrap();

        assert!(temp.path().join("page-1").join("page-1.json").is_file());
        assert!(!repository.index().exists());
        assert_eq!(repository.get("page-1").unwrap(), page);
        assert!(repository.exists("page-1").unwrap());
        assert!(!repository.exists("page-2").unwrap());
    }

    #[test]
    fn test_save_is_last_writer_wins() {
        let temp = TempDir::new().unwrap();
        let repository = JsonFileRepository::<Page>::new(temp.path());
        let mut page = Page::new("page-1", "Home");
        repository.save(&page).unwrap();

        page.name = "Landing".to_string();
        repository.save(&page).unwrap();

        assert_eq!(repository.get("page-1").unwrap().name, "Landing");
        assert_eq!(repository.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_save_registers_uuid() {
        let temp = TempDir::new().unwrap();
        let repository = JsonFileRepository::<Fragment>::new(temp.path());
        let mut fragment = Fragment::new("frag-1", "header");
        fragment.uuid = Some("uuid-1".to_string());

        repository.save(&fragment).unwrap();

        assert_eq!(
            repository.index().get("uuid-1").unwrap().as_deref(),
            Some("frag-1")
        );
        assert_eq!(repository.get_by_uuid("uuid-1").unwrap(), Some(fragment));
    }

    #[test]
    fn test_update_last_update_and_save() {
        let temp = TempDir::new().unwrap();
        let repository = JsonFileRepository::<Page>::new(temp.path());
        let mut page = Page::new("page-1", "Home");

        repository.update_last_update_and_save(&mut page).unwrap();

        assert!(page.last_update.is_some());
        assert_eq!(repository.get("page-1").unwrap().last_update, page.last_update);
    }

    #[test]
    fn test_delete_removes_directory_and_index_entry() {
        let temp = TempDir::new().unwrap();
        let repository = JsonFileRepository::<Page>::new(temp.path());
        let mut page = Page::new("page-1", "Home");
        page.uuid = Some("uuid-1".to_string());
        repository.save(&page).unwrap();

        repository.delete("page-1").unwrap();

        assert!(!temp.path().join("page-1").exists());
        assert!(repository.index().get("uuid-1").unwrap().is_none());
        assert!(matches!(
            repository.delete("page-1"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_reference_queries() {
        let temp = TempDir::new().unwrap();
        let repository = JsonFileRepository::<Page>::new(temp.path());
        let mut page = Page::new("page-1", "Home");
        page.rows = vec![json!([{ "type": "fragment", "id": "frag-1" }])];
        repository.save(&page).unwrap();
        repository.save(&Page::new("page-2", "Other")).unwrap();

        assert!(repository.contains_reference("frag-1").unwrap());
        assert!(!repository.contains_reference("frag-2").unwrap());
        let holders = repository.find_by_object_id("frag-1").unwrap();
        assert_eq!(holders, vec![page]);
        assert!(repository
            .find_by_object_ids(&["frag-1", "frag-2"])
            .unwrap()
            .contains_key("frag-1"));
    }

    #[test]
    fn test_save_rejects_invalid_id() {
        let temp = TempDir::new().unwrap();
        let repository = JsonFileRepository::<Page>::new(temp.path());

        let err = repository.save(&Page::new("a/b", "bad")).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(layout::list_entries(temp.path()).unwrap().is_empty());
    }
}
