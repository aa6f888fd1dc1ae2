//! Designer Store - filesystem-backed document store for design artifacts
//!
//! Pages, fragments and widgets are kept as one JSON document per id under
//! `<root>/<id>/<id>.json`, with an advisory uuid index and byte-level
//! reference scans to find which artifacts use which.

pub mod core;

pub use crate::core::{
    asset_service::{assets_in_order, AssetService, OrderType, UploadedFile},
    asset_store::{AssetRepository, FileAssetRepository},
    codec::DocumentCodec,
    config::StoreConfig,
    diagnostics::{Diagnostic, DiagnosticSink, MemorySink, SharedSink, TracingSink},
    error::{Result, StoreError},
    index::UuidIndex,
    loader::JsonFileLoader,
    model::{Artifact, Asset, AssetType, Fragment, HasAssets, Page, PageType, Widget},
    repository::{JsonFileRepository, Repository},
    workspace::{Usages, Workspace},
};
