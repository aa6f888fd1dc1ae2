//! Store configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::asset_store::DEFAULT_ASSETS_DIR;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root of the workspace holding every artifact kind
    pub workspace_path: PathBuf,
    /// Page directory, relative to the workspace
    pub pages_dir: String,
    /// Fragment directory, relative to the workspace
    pub fragments_dir: String,
    /// Widget directory, relative to the workspace
    pub widgets_dir: String,
    /// Name of the per-artifact directory holding asset content
    pub assets_dir_name: String,
    /// Indent documents written to disk
    pub pretty_json: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            workspace_path: Self::default_workspace_path(),
            pages_dir: "pages".to_string(),
            fragments_dir: "fragments".to_string(),
            widgets_dir: "widgets".to_string(),
            assets_dir_name: DEFAULT_ASSETS_DIR.to_string(),
            pretty_json: true,
        }
    }
}

impl StoreConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "designer-store", "DesignerStore")
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    fn default_workspace_path() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("workspace"))
            .unwrap_or_else(|| PathBuf::from("workspace"))
    }

    /// Configuration for an explicit workspace, other settings defaulted
    pub fn for_workspace(path: impl Into<PathBuf>) -> Self {
        Self {
            workspace_path: path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::load_from(&path)
    }

    /// Load configuration from `path`, defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    pub fn pages_path(&self) -> PathBuf {
        self.workspace_path.join(&self.pages_dir)
    }

    pub fn fragments_path(&self) -> PathBuf {
        self.workspace_path.join(&self.fragments_dir)
    }

    pub fn widgets_path(&self) -> PathBuf {
        self.workspace_path.join(&self.widgets_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_derived_paths() {
        let config = StoreConfig::for_workspace("/ws");
        assert_eq!(config.pages_path(), PathBuf::from("/ws/pages"));
        assert_eq!(config.fragments_path(), PathBuf::from("/ws/fragments"));
        assert_eq!(config.widgets_path(), PathBuf::from("/ws/widgets"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig::load_from(&temp.path().join("config.json")).unwrap();
        assert_eq!(config.pages_dir, "pages");
        assert!(config.pretty_json);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");
        let mut config = StoreConfig::for_workspace(temp.path().join("ws"));
        config.pretty_json = false;

        config.save_to(&path).unwrap();

        assert_eq!(StoreConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{ "workspace_path": "/data/ws", "pages_dir": "forms" }"#).unwrap();

        let config = StoreConfig::load_from(&path).unwrap();

        assert_eq!(config.pages_path(), PathBuf::from("/data/ws/forms"));
        assert_eq!(config.widgets_dir, "widgets");
    }
}
