//! Workspace discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::Store;

/// Name of the directory that marks a workspace root
pub const WORKSPACE_DIR: &str = ".sitetrack";

/// Represents a sitetrack workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .sitetrack/)
    root: PathBuf,
}

impl Workspace {
    /// Find workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Use an explicit root if given, otherwise discover from the current directory
    pub fn open(explicit: Option<&Path>) -> Result<Self, WorkspaceError> {
        match explicit {
            Some(path) => {
                let root = path
                    .canonicalize()
                    .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
                if root.join(WORKSPACE_DIR).is_dir() {
                    Ok(Self { root })
                } else {
                    Err(WorkspaceError::NotFound {
                        searched_from: path.to_path_buf(),
                    })
                }
            }
            None => Self::discover(),
        }
    }

    /// Find workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                tracing::debug!(root = %current.display(), "found workspace");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new workspace at the given path
    pub fn init(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(WORKSPACE_DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        Self::init_force(&root)
    }

    /// Initialize even if .sitetrack/ exists; existing data is kept
    pub fn init_force(path: &Path) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = root.join(WORKSPACE_DIR);

        std::fs::create_dir_all(dir.join("data"))
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        let config_path = dir.join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        }

        tracing::info!(root = %root.display(), "initialized workspace");
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Sitetrack Workspace Configuration

# Author recorded on comments (can be overridden by global config
# or the SITETRACK_AUTHOR environment variable)
# author: ""

# Default output format (auto, tsv, json, yaml, csv, md, id)
# default_format: auto
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .sitetrack configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Get the directory holding stored collections
    pub fn data_dir(&self) -> PathBuf {
        self.config_dir().join("data")
    }

    /// Open the record store for this workspace
    pub fn store(&self) -> Store {
        Store::new(self.data_dir())
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a sitetrack workspace (searched from {searched_from:?}). Run 'sitetrack init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("sitetrack workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        assert!(ws.config_dir().exists());
        assert!(ws.config_dir().join("config.yaml").exists());
        assert!(ws.data_dir().is_dir());
    }

    #[test]
    fn test_workspace_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let err = Workspace::init(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
    }

    #[test]
    fn test_workspace_init_force_keeps_config() {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        let config_path = ws.config_dir().join("config.yaml");
        std::fs::write(&config_path, "author: Pat\n").unwrap();

        Workspace::init_force(tmp.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), "author: Pat\n");
    }

    #[test]
    fn test_workspace_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("site/photos/week1");
        std::fs::create_dir_all(&subdir).unwrap();

        let ws = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            ws.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_workspace_open_explicit() {
        let tmp = tempdir().unwrap();
        assert!(Workspace::open(Some(tmp.path())).is_err());
        Workspace::init(tmp.path()).unwrap();
        assert!(Workspace::open(Some(tmp.path())).is_ok());
    }
}
