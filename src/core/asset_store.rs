//! Binary content of assets, kept next to the owning artifact

use std::path::{Path, PathBuf};

use super::error::{
    check_argument, Result, StoreError, ASSET_TYPE_IS_REQUIRED, COMPONENT_ID_IS_REQUIRED,
};
use super::layout;
use super::model::Asset;

pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Keyed blob store for asset content
pub trait AssetRepository {
    fn save(&self, asset: &Asset, content: &[u8]) -> Result<()>;
    fn delete(&self, asset: &Asset) -> Result<()>;
    fn read(&self, asset: &Asset) -> Result<Vec<u8>>;
}

/// Stores content at `<root>/<componentId>/assets/<type>/<name>`
#[derive(Debug, Clone)]
pub struct FileAssetRepository {
    root: PathBuf,
    assets_dir: String,
}

impl FileAssetRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_assets_dir(root, DEFAULT_ASSETS_DIR)
    }

    pub fn with_assets_dir(root: impl Into<PathBuf>, assets_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            assets_dir: assets_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the content of `asset` lives
    pub fn resolve(&self, asset: &Asset) -> Result<PathBuf> {
        let component_id = asset
            .component_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::invalid(COMPONENT_ID_IS_REQUIRED))?;
        let asset_type = asset
            .asset_type
            .ok_or_else(|| StoreError::invalid(ASSET_TYPE_IS_REQUIRED))?;
        check_argument(
            !asset.external,
            &format!("external asset {} has no stored content", asset.name),
        )?;
        layout::validate_id(&asset.name)
            .map_err(|_| StoreError::invalid(format!("invalid asset name: {:?}", asset.name)))?;

        Ok(layout::artifact_dir(&self.root, component_id)?
            .join(&self.assets_dir)
            .join(asset_type.key())
            .join(&asset.name))
    }

    pub fn exists(&self, asset: &Asset) -> Result<bool> {
        Ok(self.resolve(asset)?.is_file())
    }
}

impl AssetRepository for FileAssetRepository {
    fn save(&self, asset: &Asset, content: &[u8]) -> Result<()> {
        let path = self.resolve(asset)?;
        layout::write_whole(&path, content)?;
        tracing::debug!(asset = %asset.name, "saved asset content: {}", path.display());
        Ok(())
    }

    fn delete(&self, asset: &Asset) -> Result<()> {
        layout::delete(&self.resolve(asset)?)
    }

    fn read(&self, asset: &Asset) -> Result<Vec<u8>> {
        layout::read(&self.resolve(asset)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::AssetType;
    use tempfile::TempDir;

    fn page_asset(name: &str) -> Asset {
        Asset::new(name, AssetType::Javascript).with_component_id("page-1")
    }

    #[test]
    fn test_content_lives_in_owning_artifact_dir() {
        let temp = TempDir::new().unwrap();
        let store = FileAssetRepository::new(temp.path());
        let asset = page_asset("main.js");

        store.save(&asset, b"function(){}").unwrap();

        let expected = temp.path().join("page-1/assets/js/main.js");
        assert_eq!(store.resolve(&asset).unwrap(), expected);
        assert_eq!(store.read(&asset).unwrap(), b"function(){}");
        assert!(store.exists(&asset).unwrap());
    }

    #[test]
    fn test_delete_then_read_fails() {
        let temp = TempDir::new().unwrap();
        let store = FileAssetRepository::new(temp.path());
        let asset = page_asset("main.js");
        store.save(&asset, b"x").unwrap();

        store.delete(&asset).unwrap();

        assert!(!store.exists(&asset).unwrap());
        assert!(matches!(store.read(&asset), Err(StoreError::Io { .. })));
        assert!(store.delete(&asset).is_err());
    }

    #[test]
    fn test_resolve_preconditions() {
        let store = FileAssetRepository::new("/workspace/pages");

        let orphan = Asset::new("main.js", AssetType::Javascript);
        assert_eq!(
            store.resolve(&orphan).unwrap_err().to_string(),
            COMPONENT_ID_IS_REQUIRED
        );

        let mut untyped = page_asset("main.js");
        untyped.asset_type = None;
        assert_eq!(
            store.resolve(&untyped).unwrap_err().to_string(),
            ASSET_TYPE_IS_REQUIRED
        );

        assert!(store.resolve(&page_asset("../main.js")).is_err());
        assert!(store
            .resolve(&page_asset("https://cdn.example/lib.js").external())
            .is_err());
    }
}
