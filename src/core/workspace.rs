//! Pages, fragments and widgets of one workspace

use super::asset_service::AssetService;
use super::asset_store::FileAssetRepository;
use super::codec::DocumentCodec;
use super::config::StoreConfig;
use super::diagnostics::{default_sink, SharedSink};
use super::error::Result;
use super::model::{Fragment, Page, Widget};
use super::repository::JsonFileRepository;

/// Artifacts that reference a given id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Usages {
    pub pages: Vec<Page>,
    pub fragments: Vec<Fragment>,
}

impl Usages {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.fragments.is_empty()
    }
}

/// Repositories of a workspace, sharing codec and diagnostic sink
pub struct Workspace {
    config: StoreConfig,
    pages: JsonFileRepository<Page>,
    fragments: JsonFileRepository<Fragment>,
    widgets: JsonFileRepository<Widget>,
    sink: SharedSink,
}

impl Workspace {
    pub fn open(config: StoreConfig) -> Self {
        Self::with_sink(config, default_sink())
    }

    pub fn with_sink(config: StoreConfig, sink: SharedSink) -> Self {
        let codec = DocumentCodec::new(config.pretty_json);
        Self {
            pages: JsonFileRepository::with_options(config.pages_path(), codec, sink.clone()),
            fragments: JsonFileRepository::with_options(
                config.fragments_path(),
                codec,
                sink.clone(),
            ),
            widgets: JsonFileRepository::with_options(config.widgets_path(), codec, sink.clone()),
            config,
            sink,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn pages(&self) -> &JsonFileRepository<Page> {
        &self.pages
    }

    pub fn fragments(&self) -> &JsonFileRepository<Fragment> {
        &self.fragments
    }

    pub fn widgets(&self) -> &JsonFileRepository<Widget> {
        &self.widgets
    }

    pub fn page_assets(&self) -> AssetService<&JsonFileRepository<Page>, FileAssetRepository> {
        AssetService::with_sink(
            &self.pages,
            FileAssetRepository::with_assets_dir(
                self.config.pages_path(),
                &self.config.assets_dir_name,
            ),
            self.sink.clone(),
        )
    }

    pub fn widget_assets(&self) -> AssetService<&JsonFileRepository<Widget>, FileAssetRepository> {
        AssetService::with_sink(
            &self.widgets,
            FileAssetRepository::with_assets_dir(
                self.config.widgets_path(),
                &self.config.assets_dir_name,
            ),
            self.sink.clone(),
        )
    }

    /// Pages and fragments that embed the fragment or widget `id`
    pub fn usages(&self, id: &str) -> Result<Usages> {
        Ok(Usages {
            pages: self.pages.find_by_object_id(id)?,
            fragments: self.fragments.find_by_object_id(id)?,
        })
    }

    /// Whether anything else in the workspace still mentions `id`
    pub fn is_referenced(&self, id: &str) -> Result<bool> {
        Ok(self.pages.contains_reference(id)? || self.fragments.contains_reference(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset_service::{OrderType, UploadedFile};
    use crate::core::asset_store::AssetRepository;
    use crate::core::diagnostics::{Diagnostic, MemorySink};
    use crate::core::model::{Asset, AssetType};
    use crate::core::repository::Repository;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> Workspace {
        Workspace::open(StoreConfig::for_workspace(temp.path()))
    }

    #[test]
    fn test_usages_across_pages_and_fragments() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);

        let mut header = Fragment::new("header", "Header");
        header.rows = vec![json!([{ "type": "fragment", "id": "logo" }])];
        ws.fragments().save(&header).unwrap();
        ws.fragments().save(&Fragment::new("logo", "Logo")).unwrap();

        let mut home = Page::new("home", "Home");
        home.rows = vec![json!([{ "type": "fragment", "id": "header" }])];
        ws.pages().save(&home).unwrap();

        let logo = ws.usages("logo").unwrap();
        assert!(logo.pages.is_empty());
        assert_eq!(logo.fragments, vec![header]);

        let usages = ws.usages("header").unwrap();
        assert_eq!(usages.pages, vec![home]);
        assert!(usages.fragments.is_empty());

        assert!(ws.is_referenced("header").unwrap());
        assert!(!ws.is_referenced("footer").unwrap());
        assert!(ws.usages("footer").unwrap().is_empty());
    }

    #[test]
    fn test_page_asset_lifecycle_on_disk() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let mut page = Page::new("home", "Home");
        ws.pages().save(&page).unwrap();
        let assets = ws.page_assets();

        let first = assets
            .upload(Some(&UploadedFile::new("a.js", "a()")), &mut page, "js")
            .unwrap();
        let second = assets
            .upload(Some(&UploadedFile::new("b.css", "b{}")), &mut page, "css")
            .unwrap();
        assert_eq!((first.order, second.order), (1, 2));
        assert!(temp.path().join("pages/home/assets/js/a.js").is_file());

        let moved = assets.change_order(&second, OrderType::Decrement).unwrap();
        assert_eq!(moved.order, 1);
        let stored = ws.pages().get("home").unwrap();
        assert_eq!(
            stored
                .assets
                .iter()
                .map(|a| (a.name.as_str(), a.order))
                .collect::<Vec<_>>(),
            vec![("a.js", 2), ("b.css", 1)]
        );

        let mut page = stored;
        assets.delete(&mut page, &first).unwrap();
        assert!(!temp.path().join("pages/home/assets/js/a.js").exists());
        assert_eq!(ws.pages().get("home").unwrap().assets.len(), 1);
        assert_eq!(
            assets.asset_repository().read(&second).unwrap(),
            b"b{}".to_vec()
        );
    }

    #[test]
    fn test_asset_services_report_to_workspace_sink() {
        let temp = TempDir::new().unwrap();
        let sink = Arc::new(MemorySink::new());
        let ws = Workspace::with_sink(StoreConfig::for_workspace(temp.path()), sink.clone());
        let mut page = Page::new("home", "Home");
        ws.pages().save(&page).unwrap();
        let assets = ws.page_assets();
        let asset = assets
            .save(&mut page, &Asset::new("missing.js", AssetType::Javascript))
            .unwrap();

        assets.delete(&mut page, &asset).unwrap();

        assert!(ws.pages().get("home").unwrap().assets.is_empty());
        assert!(matches!(
            sink.events().as_slice(),
            [Diagnostic::AssetContentNotDeleted { component_id, asset, .. }]
                if component_id == "home" && asset == "missing.js"
        ));
    }
}
