//! String-keyed record store
//!
//! Each key maps to one JSON document under the workspace data directory.
//! Collections are always read and replaced whole: there are no partial
//! updates and no transactions, the last write wins.
//!
//! A missing document reads as an empty collection. So does a document that
//! cannot be parsed; the problem is logged and the caller carries on with
//! nothing rather than failing. Inside a readable list, records that cannot
//! be decoded are skipped one by one.
//!
//! Whenever a read had to drop something, the store remembers the key. The
//! next write to that key first copies the old file to
//! `<key>.<timestamp>.bak.json` so nothing is lost by replacing it.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project records
pub const PROJECTS: &str = "projects";
/// Procurement log entries for all projects
pub const PROCUREMENT_ITEMS: &str = "procurementItems";
/// Submittal log entries for all projects
pub const SUBMITTAL_ITEMS: &str = "submittalsItems";
/// Name of the project commands default to
pub const ACTIVE_PROJECT: &str = "activeProject";
/// Team members keyed by project name
pub const TEAM_MEMBERS: &str = "projectTeamMembers";
/// Project documents keyed by project name
pub const DOCUMENTS: &str = "projectDocuments";
/// Project areas keyed by project name
pub const AREAS: &str = "projectBreakdown";

/// JSON document store rooted at a directory
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
    /// Keys whose last read dropped data
    damaged: RefCell<BTreeSet<String>>,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            damaged: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Read a whole collection. Missing or malformed documents read as empty.
    pub fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let documents = self.load_documents(key);
        self.decode_collection(key, documents)
    }

    /// Read a collection as raw JSON records
    pub fn load_documents(&self, key: &str) -> Vec<Value> {
        match self.load_value::<Value>(key) {
            None => Vec::new(),
            Some(Value::Array(documents)) => documents,
            Some(other) => {
                tracing::warn!(%key, found = json_kind(&other), "stored document is not a list, treating as empty");
                self.mark_damaged(key);
                Vec::new()
            }
        }
    }

    /// Decode raw records, skipping any that do not fit `T`
    pub fn decode_collection<T: DeserializeOwned>(&self, key: &str, documents: Vec<Value>) -> Vec<T> {
        documents
            .into_iter()
            .enumerate()
            .filter_map(|(index, document)| match serde_json::from_value(document) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(%key, index, error = %e, "skipping unreadable record");
                    self.mark_damaged(key);
                    None
                }
            })
            .collect()
    }

    /// Replace a whole collection
    pub fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        self.save_value(key, &items)
    }

    /// Read a single stored value, `None` if missing or malformed
    pub fn load_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = match self.path_for(key) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(%key, error = %e, "refusing to read key");
                return None;
            }
        };

        if !path.exists() {
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to read stored document");
                self.mark_damaged(key);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%key, error = %e, "malformed stored document, treating as empty");
                self.mark_damaged(key);
                None
            }
        }
    }

    /// Whether a read of `key` dropped data that the next write would lose
    pub fn is_damaged(&self, key: &str) -> bool {
        self.damaged.borrow().contains(key)
    }

    fn mark_damaged(&self, key: &str) {
        self.damaged.borrow_mut().insert(key.to_string());
    }

    /// Copy the current file for `key` aside before it is replaced
    fn back_up(&self, key: &str, path: &Path) -> Result<(), StoreError> {
        if !self.damaged.borrow_mut().remove(key) || !path.exists() {
            return Ok(());
        }
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        let backup = self.dir.join(format!("{}.{}.bak.json", key, stamp));
        fs::copy(path, &backup).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })?;
        tracing::warn!(%key, backup = %backup.display(), "kept a copy of the unreadable document");
        Ok(())
    }

    /// Replace a single stored value
    pub fn save_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let content = serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            key: key.to_string(),
            source,
        })?;
        self.back_up(key, &path)?;

        // Write beside the target then rename so readers never see a torn file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|source| StoreError::Io {
                key: key.to_string(),
                source,
            })?;

        tracing::debug!(%key, "saved document");
        Ok(())
    }

    /// Remove a stored value. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        self.back_up(key, &path)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Errors writing to the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store key '{0}' (use letters, digits, '_' or '-')")]
    InvalidKey(String),

    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        qty: u32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "rebar".to_string(),
                qty: 40,
            },
            Row {
                name: "curtain wall".to_string(),
                qty: 2,
            },
        ]
    }

    #[test]
    fn test_collection_roundtrip() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());

        store.save_collection(PROJECTS, &rows()).unwrap();
        let loaded: Vec<Row> = store.load_collection(PROJECTS);
        assert_eq!(loaded, rows());
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path().join("not-created-yet"));
        let loaded: Vec<Row> = store.load_collection(PROCUREMENT_ITEMS);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_malformed_collection_is_empty() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        fs::write(tmp.path().join("submittalsItems.json"), "{not json").unwrap();

        let loaded: Vec<Row> = store.load_collection(SUBMITTAL_ITEMS);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_empty() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        fs::write(tmp.path().join("projects.json"), r#"{"name": "x"}"#).unwrap();

        let loaded: Vec<Row> = store.load_collection(PROJECTS);
        assert!(loaded.is_empty());
    }

    fn backups(dir: &Path, key: &str) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                name.starts_with(&format!("{}.", key)) && name.ends_with(".bak.json")
            })
            .collect()
    }

    #[test]
    fn test_unreadable_records_are_skipped() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        fs::write(
            tmp.path().join("projects.json"),
            r#"[{"name": "rebar", "qty": 40}, {"name": null}, {"name": "anchors", "qty": 6}]"#,
        )
        .unwrap();

        let loaded: Vec<Row> = store.load_collection(PROJECTS);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].name, "anchors");
        assert!(store.is_damaged(PROJECTS));
    }

    #[test]
    fn test_replacing_damaged_document_keeps_backup() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        let original = r#"[{"name": "rebar", "qty": 40}, {"name": null}]"#;
        fs::write(tmp.path().join("projects.json"), original).unwrap();

        let mut loaded: Vec<Row> = store.load_collection(PROJECTS);
        loaded.push(Row {
            name: "anchors".to_string(),
            qty: 6,
        });
        store.save_collection(PROJECTS, &loaded).unwrap();

        let saved = backups(tmp.path(), PROJECTS);
        assert_eq!(saved.len(), 1);
        assert_eq!(fs::read_to_string(&saved[0]).unwrap(), original);
        assert!(!store.is_damaged(PROJECTS));

        // A clean document is replaced without another copy
        let _: Vec<Row> = store.load_collection(PROJECTS);
        store.save_collection(PROJECTS, &rows()).unwrap();
        assert_eq!(backups(tmp.path(), PROJECTS).len(), 1);
    }

    #[test]
    fn test_clean_writes_leave_no_backup() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        store.save_collection(PROJECTS, &rows()).unwrap();
        let _: Vec<Row> = store.load_collection(PROJECTS);
        store.save_collection(PROJECTS, &rows()[..1]).unwrap();
        assert!(backups(tmp.path(), PROJECTS).is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());

        store.save_collection(PROJECTS, &rows()).unwrap();
        store.save_collection(PROJECTS, &rows()[..1]).unwrap();

        let loaded: Vec<Row> = store.load_collection(PROJECTS);
        assert_eq!(loaded.len(), 1);
        assert!(!tmp.path().join("projects.json.tmp").exists());
    }

    #[test]
    fn test_value_and_remove() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());

        store.save_value(ACTIVE_PROJECT, "Harbor Tower").unwrap();
        assert_eq!(
            store.load_value::<String>(ACTIVE_PROJECT).as_deref(),
            Some("Harbor Tower")
        );

        store.remove(ACTIVE_PROJECT).unwrap();
        assert!(store.load_value::<String>(ACTIVE_PROJECT).is_none());
        store.remove(ACTIVE_PROJECT).unwrap();
    }

    #[test]
    fn test_invalid_key_rejected() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path());
        let err = store.save_collection("../escape", &rows()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
