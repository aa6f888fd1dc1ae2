//! Registration, upload and ordering of the assets attached to an artifact

use uuid::Uuid;

use super::asset_store::AssetRepository;
use super::diagnostics::{default_sink, Diagnostic, SharedSink};
use super::error::{
    check_argument, Result, StoreError, ASSET_TYPE_IS_REQUIRED, ASSET_URL_IS_REQUIRED,
    COMPONENT_ID_IS_REQUIRED, FILE_PART_IS_REQUIRED,
};
use super::model::{Artifact, Asset, AssetType, HasAssets};
use super::repository::Repository;

/// Direction of an order change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    /// Move one position towards the end
    Increment,
    /// Move one position towards the start
    Decrement,
}

/// A file received for upload
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// Name as sent by the client, possibly with a path
    pub original_filename: Option<String>,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(original_filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            original_filename: Some(original_filename.into()),
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Original filename without any directory part
    pub fn filename(&self) -> String {
        self.original_filename
            .as_deref()
            .and_then(|name| name.rsplit(['/', '\\']).next())
            .unwrap_or_default()
            .to_string()
    }
}

/// Assets sorted by their order
pub fn assets_in_order<T: HasAssets>(artifact: &T) -> Vec<Asset> {
    let mut assets = artifact.assets().to_vec();
    assets.sort_by_key(|a| a.order);
    assets
}

fn next_order<T: HasAssets>(artifact: &T) -> u32 {
    artifact.assets().iter().map(|a| a.order).max().unwrap_or(0) + 1
}

fn check_asset(asset: &Asset) -> Result<()> {
    check_argument(!asset.name.is_empty(), ASSET_URL_IS_REQUIRED)?;
    check_argument(asset.asset_type.is_some(), ASSET_TYPE_IS_REQUIRED)
}

/// Manages the asset list of artifacts stored in `R`, with content in `A`
pub struct AssetService<R, A> {
    repository: R,
    asset_repository: A,
    sink: SharedSink,
}

impl<R, A> AssetService<R, A>
where
    R: Repository,
    R::Artifact: HasAssets,
    A: AssetRepository,
{
    pub fn new(repository: R, asset_repository: A) -> Self {
        Self::with_sink(repository, asset_repository, default_sink())
    }

    pub fn with_sink(repository: R, asset_repository: A, sink: SharedSink) -> Self {
        Self {
            repository,
            asset_repository,
            sink,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn asset_repository(&self) -> &A {
        &self.asset_repository
    }

    /// Store uploaded content as an asset of `artifact`
    ///
    /// An asset with the same name and type gets its content replaced in
    /// place; otherwise a new asset is appended after the last one. A new
    /// asset whose owner cannot be saved is taken off `artifact` again and
    /// its content deleted.
    pub fn upload(
        &self,
        file: Option<&UploadedFile>,
        artifact: &mut R::Artifact,
        asset_type: &str,
    ) -> Result<Asset> {
        let file = match file {
            Some(file) if !file.is_empty() => file,
            _ => return Err(StoreError::invalid(FILE_PART_IS_REQUIRED)),
        };
        let asset_type = AssetType::from_key(asset_type)
            .ok_or_else(|| StoreError::invalid(ASSET_TYPE_IS_REQUIRED))?;
        let filename = file.filename();
        check_argument(!filename.is_empty(), ASSET_URL_IS_REQUIRED)?;

        let component_id = artifact.id().to_string();
        let candidate = Asset::new(filename.clone(), asset_type).with_component_id(&component_id);
        let import_error = |e: StoreError| StoreError::Import {
            filename: filename.clone(),
            message: e.to_string(),
        };

        let existing = artifact
            .assets()
            .iter()
            .position(|a| a.same_identity(&candidate));

        let asset = match existing {
            Some(position) => {
                let stored = &mut artifact.assets_mut()[position];
                if stored.component_id.is_none() {
                    stored.component_id = Some(component_id.clone());
                }
                let stored = stored.clone();
                if let Err(e) = self.asset_repository.delete(&stored) {
                    self.report_content_not_deleted(&component_id, &stored, &e);
                }
                self.asset_repository
                    .save(&stored, &file.content)
                    .map_err(import_error)?;
                self.repository
                    .update_last_update_and_save(artifact)
                    .map_err(import_error)?;
                stored
            }
            None => {
                let mut asset = candidate;
                asset.id = Some(Uuid::new_v4().to_string());
                asset.order = next_order(&*artifact);
                self.asset_repository
                    .save(&asset, &file.content)
                    .map_err(import_error)?;
                artifact.assets_mut().push(asset.clone());
                if let Err(e) = self.repository.update_last_update_and_save(artifact) {
                    // undo the registration
                    artifact.assets_mut().pop();
                    if let Err(cleanup) = self.asset_repository.delete(&asset) {
                        self.report_content_not_deleted(&component_id, &asset, &cleanup);
                    }
                    return Err(import_error(e));
                }
                asset
            }
        };

        tracing::info!(component_id = %component_id, asset = %asset.name, "uploaded asset");
        Ok(asset)
    }

    /// Register `asset` on `artifact`, or re-save it if already registered
    ///
    /// Re-saving keeps the stored order; only `change_order` moves an asset.
    pub fn save(&self, artifact: &mut R::Artifact, asset: &Asset) -> Result<Asset> {
        check_asset(asset)?;
        let component_id = artifact.id().to_string();

        let existing = artifact
            .assets()
            .iter()
            .position(|a| a.same_identity(asset));

        let stored = match existing {
            Some(position) => {
                let current = &mut artifact.assets_mut()[position];
                let mut updated = asset.clone();
                updated.id = updated.id.or_else(|| current.id.clone());
                updated.order = current.order;
                updated.component_id = Some(component_id);
                *current = updated.clone();
                updated
            }
            None => {
                let mut added = asset.clone();
                added.id = added.id.or_else(|| Some(Uuid::new_v4().to_string()));
                added.order = next_order(&*artifact);
                added.component_id = Some(component_id);
                artifact.assets_mut().push(added.clone());
                added
            }
        };

        self.repository.update_last_update_and_save(artifact)?;
        Ok(stored)
    }

    /// Remove `asset` from `artifact` along with its content
    ///
    /// Content that cannot be deleted is reported to the sink and the asset
    /// is removed from the artifact anyway. Orders of the remaining assets
    /// are left untouched.
    pub fn delete(&self, artifact: &mut R::Artifact, asset: &Asset) -> Result<()> {
        check_asset(asset)?;
        let component_id = artifact.id().to_string();

        if !asset.external {
            let mut target = asset.clone();
            if target.component_id.is_none() {
                target.component_id = Some(component_id.clone());
            }
            if let Err(e) = self.asset_repository.delete(&target) {
                self.report_content_not_deleted(&component_id, &target, &e);
            }
        }

        artifact.assets_mut().retain(|a| !a.same_identity(asset));
        self.repository.update_last_update_and_save(artifact)
    }

    /// Swap the order of `asset` with its neighbour in `direction`
    ///
    /// Moving the first asset down or the last one up changes nothing. Siblings
    /// sharing an order are first renumbered 1..N in their current sequence.
    /// The owning artifact is saved in every case and the asset is returned
    /// as stored.
    pub fn change_order(&self, asset: &Asset, direction: OrderType) -> Result<Asset> {
        check_asset(asset)?;
        let component_id = asset
            .component_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::invalid(COMPONENT_ID_IS_REQUIRED))?;

        let mut artifact = self.repository.get(component_id)?;

        let mut sorted: Vec<usize> = (0..artifact.assets().len()).collect();
        sorted.sort_by_key(|&i| artifact.assets()[i].order);
        let tied = sorted
            .windows(2)
            .any(|w| artifact.assets()[w[0]].order == artifact.assets()[w[1]].order);
        if tied {
            let assets = artifact.assets_mut();
            for (rank, &i) in sorted.iter().enumerate() {
                assets[i].order = rank as u32 + 1;
            }
            tracing::debug!(component_id, "renumbered tied asset orders");
        }
        let position = sorted
            .iter()
            .position(|&i| artifact.assets()[i].same_identity(asset))
            .ok_or_else(|| StoreError::NotFound {
                kind: "asset",
                id: format!("{} in {}", asset.name, component_id),
            })?;

        let neighbour = match direction {
            OrderType::Increment if position + 1 < sorted.len() => Some(position + 1),
            OrderType::Decrement if position > 0 => Some(position - 1),
            _ => None,
        };

        if let Some(neighbour) = neighbour {
            let (current, other) = (sorted[position], sorted[neighbour]);
            let assets = artifact.assets_mut();
            let order = assets[current].order;
            assets[current].order = assets[other].order;
            assets[other].order = order;
        }

        self.repository.update_last_update_and_save(&mut artifact)?;
        Ok(artifact.assets()[sorted[position]].clone())
    }

    fn report_content_not_deleted(&self, component_id: &str, asset: &Asset, error: &StoreError) {
        self.sink.emit(Diagnostic::AssetContentNotDeleted {
            component_id: component_id.to_string(),
            asset: asset.name.clone(),
            reason: error.to_string(),
        });
    }
}
