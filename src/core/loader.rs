//! Lookup of artifacts stored as one JSON file per directory

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::marker::PhantomData;
use std::path::Path;

use super::codec::DocumentCodec;
use super::diagnostics::{default_sink, Diagnostic, SharedSink};
use super::error::{Result, StoreError};
use super::index::UuidIndex;
use super::layout::{self, ArtifactEntry};
use super::model::Artifact;
use super::scanner::{self, NormalizedDocument};

/// Reads artifacts of type `T` from a directory laid out as `<id>/<id>.json`
pub struct JsonFileLoader<T> {
    codec: DocumentCodec,
    sink: SharedSink,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFileLoader<T> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec,
            sink: self.sink.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Artifact> Default for JsonFileLoader<T> {
    fn default() -> Self {
        Self::new(DocumentCodec::default(), default_sink())
    }
}

impl<T: Artifact> JsonFileLoader<T> {
    pub fn new(codec: DocumentCodec, sink: SharedSink) -> Self {
        Self {
            codec,
            sink,
            _marker: PhantomData,
        }
    }

    /// Decode the document at `path`
    pub fn load(&self, path: &Path) -> Result<T> {
        let bytes = layout::read(path)?;
        self.decode(path, &bytes)
    }

    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<T> {
        self.codec
            .from_json(bytes)
            .map_err(|source| StoreError::Decode {
                path: path.to_path_buf(),
                source,
            })
    }

    /// The artifact stored under `id`
    pub fn get(&self, directory: &Path, id: &str) -> Result<T> {
        self.find(directory, id)?.ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })
    }

    /// The artifact stored under `id`, if its canonical file exists
    pub fn find(&self, directory: &Path, id: &str) -> Result<Option<T>> {
        let path = layout::artifact_file(directory, id)?;
        match std::fs::read(&path) {
            Ok(bytes) => self.decode(&path, &bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Every materialized artifact of `directory`, sorted by id
    pub fn get_all(&self, directory: &Path) -> Result<Vec<T>> {
        let mut artifacts = Vec::new();
        for entry in self.materialized_entries(directory)? {
            artifacts.push(self.load(&entry.file)?);
        }
        Ok(artifacts)
    }

    /// Artifacts whose document references `object_id`
    pub fn find_by_object_id(&self, directory: &Path, object_id: &str) -> Result<Vec<T>> {
        let mut found = self.find_by_object_ids(directory, &[object_id])?;
        Ok(found.remove(object_id).unwrap_or_default())
    }

    /// For each requested id, the artifacts whose document references it
    ///
    /// Each document is read and decoded once whatever the number of ids.
    /// Ids that nothing references are absent from the result. A document
    /// that fails to decode aborts the scan.
    pub fn find_by_object_ids<S: AsRef<str>>(
        &self,
        directory: &Path,
        object_ids: &[S],
    ) -> Result<HashMap<String, Vec<T>>> {
        self.scan_references(directory, object_ids, |path, bytes| self.decode(path, bytes))
    }

    fn scan_references<S, F>(
        &self,
        directory: &Path,
        object_ids: &[S],
        mut decode: F,
    ) -> Result<HashMap<String, Vec<T>>>
    where
        S: AsRef<str>,
        F: FnMut(&Path, &[u8]) -> Result<T>,
    {
        let targets = object_ids
            .iter()
            .map(|id| {
                let id = id.as_ref();
                layout::self_match_path(directory, id).map(|own_file| (id, own_file))
            })
            .collect::<Result<Vec<_>>>()?;
        let unique: BTreeSet<&str> = targets.iter().map(|(id, _)| *id).collect();
        if unique.len() != targets.len() {
            tracing::debug!("ignoring duplicated ids in reference scan");
        }

        let mut found: HashMap<String, Vec<T>> = HashMap::new();
        if targets.is_empty() {
            return Ok(found);
        }

        for entry in self.materialized_entries(directory)? {
            let bytes = layout::read(&entry.file)?;
            let artifact = decode(&entry.file, &bytes)?;
            let document = NormalizedDocument::new(&bytes);

            let mut seen = BTreeSet::new();
            for (id, own_file) in &targets {
                if !seen.insert(*id) || *own_file == entry.file {
                    continue;
                }
                if document.references(id) {
                    found
                        .entry(id.to_string())
                        .or_default()
                        .push(artifact.clone());
                }
            }
        }

        tracing::debug!(
            directory = %directory.display(),
            requested = unique.len(),
            matched = found.len(),
            "reference scan done"
        );
        Ok(found)
    }

    /// Resolve an artifact through the uuid index
    ///
    /// A missing index or an unknown uuid resolve to `None`. An index entry
    /// pointing at a file that cannot be read is an error.
    pub fn get_by_uuid(&self, directory: &Path, uuid: &str) -> Result<Option<T>> {
        let index = UuidIndex::for_root(directory);
        if !index.exists() {
            self.sink.emit(Diagnostic::IndexMissing {
                path: index.path().to_path_buf(),
            });
            return Ok(None);
        }

        match index.get(uuid)? {
            Some(id) => {
                let path = layout::artifact_file(directory, &id)?;
                self.load(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Whether any other artifact's raw document mentions `object_id`
    pub fn contains(&self, directory: &Path, object_id: &str) -> Result<bool> {
        let own_file = layout::self_match_path(directory, object_id)?;

        for entry in self.materialized_entries(directory)? {
            if entry.file == own_file {
                continue;
            }
            let bytes = layout::read(&entry.file)?;
            if scanner::mentions(&bytes, object_id) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn materialized_entries(&self, directory: &Path) -> Result<Vec<ArtifactEntry>> {
        let mut entries = layout::list_entries(directory)?;
        entries.retain(|entry| {
            let materialized = entry.is_materialized();
            if !materialized {
                self.sink.emit(Diagnostic::UnmaterializedArtifact {
                    directory: entry.directory.clone(),
                });
            }
            materialized
        });
        Ok(entries)
    }
}
