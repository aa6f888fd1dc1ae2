//! Storage of design artifacts and their assets on the filesystem

pub mod asset_service;
pub mod asset_store;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod layout;
pub mod loader;
pub mod model;
pub mod repository;
pub mod scanner;
pub mod workspace;
