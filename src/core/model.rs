//! Artifact and asset documents

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A design unit persisted as one JSON document per id
pub trait Artifact: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Human readable kind, used in messages
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    /// Stable surrogate key; older documents have none
    fn uuid(&self) -> Option<&str>;
    fn set_last_update(&mut self, epoch_millis: i64);
}

/// An artifact that owns an ordered list of assets
pub trait HasAssets: Artifact {
    fn assets(&self) -> &[Asset];
    fn assets_mut(&mut self) -> &mut Vec<Asset>;
}

/// Kind of file attached to an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "js")]
    Javascript,
    #[serde(rename = "css")]
    Css,
    #[serde(rename = "img")]
    Image,
}

impl AssetType {
    pub const ALL: [AssetType; 3] = [AssetType::Javascript, AssetType::Css, AssetType::Image];

    /// Parse the short key used in requests and documents
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    pub fn key(&self) -> &'static str {
        match self {
            AssetType::Javascript => "js",
            AssetType::Css => "css",
            AssetType::Image => "img",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A named, typed, ordered file attached to an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub asset_type: Option<AssetType>,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    /// Referenced by URL; no content is stored for it
    #[serde(default)]
    pub external: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Asset {
    pub fn new(name: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            id: None,
            name: name.into(),
            asset_type: Some(asset_type),
            order: 0,
            component_id: None,
            external: false,
            active: true,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_component_id(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = Some(component_id.into());
        self
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Same asset: equal ids when both have one, otherwise equal name and type
    pub fn same_identity(&self, other: &Asset) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name == other.name && self.asset_type == other.asset_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    #[default]
    Page,
    Form,
    Layout,
}

/// A page, form or layout
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub page_type: PageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designer_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<i64>,
    /// Layout rows; elements may reference fragments and widgets by id
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Page {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Artifact for Page {
    const KIND: &'static str = "page";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn set_last_update(&mut self, epoch_millis: i64) {
        self.last_update = Some(epoch_millis);
    }
}

impl HasAssets for Page {
    fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn assets_mut(&mut self) -> &mut Vec<Asset> {
        &mut self.assets
    }
}

/// A reusable group of rows embedded in pages or other fragments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designer_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<i64>,
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
}

impl Fragment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Artifact for Fragment {
    const KIND: &'static str = "fragment";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn set_last_update(&mut self, epoch_millis: i64) {
        self.last_update = Some(epoch_millis);
    }
}

/// A palette widget
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default)]
    pub properties: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<i64>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Widget {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Artifact for Widget {
    const KIND: &'static str = "widget";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn set_last_update(&mut self, epoch_millis: i64) {
        self.last_update = Some(epoch_millis);
    }
}

impl HasAssets for Widget {
    fn assets(&self) -> &[Asset] {
        &self.assets
    }

    fn assets_mut(&mut self) -> &mut Vec<Asset> {
        &mut self.assets
    }
}
