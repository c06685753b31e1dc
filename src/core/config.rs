//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Workspace;

/// Sitetrack configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Author recorded on comments
    pub author: Option<String>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/sitetrack/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Workspace config (.sitetrack/config.yaml)
        if let Some(ws) = workspace {
            if let Some(local) = Self::read_file(&ws.config_dir().join("config.yaml")) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        if let Ok(author) = std::env::var("SITETRACK_AUTHOR") {
            config.author = Some(author);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        // The generated config only carries commented-out examples
        let has_settings = contents
            .lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && !line.starts_with('#') && line != "---");
        if !has_settings {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "sitetrack")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base = Config {
            author: Some("Global".to_string()),
            default_format: Some("tsv".to_string()),
        };
        base.merge(Config {
            author: Some("Workspace".to_string()),
            default_format: None,
        });
        assert_eq!(base.author.as_deref(), Some("Workspace"));
        assert_eq!(base.default_format.as_deref(), Some("tsv"));
    }

    #[test]
    fn test_workspace_config_is_read() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        std::fs::write(
            ws.config_dir().join("config.yaml"),
            "author: Site Office\ndefault_format: json\n",
        )
        .unwrap();

        let local = Config::read_file(&ws.config_dir().join("config.yaml")).unwrap();
        assert_eq!(local.author.as_deref(), Some("Site Office"));
        assert_eq!(local.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_generated_config_has_no_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        assert!(Config::read_file(&ws.config_dir().join("config.yaml")).is_none());

        std::fs::write(ws.config_dir().join("config.yaml"), "---\n\n").unwrap();
        assert!(Config::read_file(&ws.config_dir().join("config.yaml")).is_none());
    }

    #[test]
    fn test_explicit_author_wins() {
        let config = Config {
            author: Some("Pat".to_string()),
            default_format: None,
        };
        assert_eq!(config.author(), "Pat");
    }
}
