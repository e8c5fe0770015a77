// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Dataset Heads
//!
//! Mutable, named references to immutable commits. Each dataset head is a
//! file `refs/datasets/<name>` holding the hex id of its newest commit.

use crate::objects::ObjectId;
use crate::store::write_atomic;
use dashmap::DashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Reference errors
#[derive(Debug, Error)]
pub enum RefError {
    #[error("Invalid dataset name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Malformed head for dataset {0}")]
    MalformedHead(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Reference store - one head per dataset
pub struct RefStore {
    heads: DashMap<String, ObjectId>,
    /// `<store>/refs/datasets`, or `None` for in-memory
    refs_dir: Option<PathBuf>,
}

impl RefStore {
    /// Create a new reference store (in-memory only)
    pub fn in_memory() -> Self {
        Self {
            heads: DashMap::new(),
            refs_dir: None,
        }
    }

    /// Open with persistence under `<root>/refs/datasets`, loading existing heads
    pub fn open(root: &std::path::Path) -> Result<Self, RefError> {
        let refs_dir = root.join("refs").join("datasets");
        fs::create_dir_all(&refs_dir)?;

        let store = Self {
            heads: DashMap::new(),
            refs_dir: Some(refs_dir),
        };
        store.load_refs()?;
        Ok(store)
    }

    fn load_refs(&self) -> Result<(), RefError> {
        let refs_dir = match &self.refs_dir {
            Some(dir) => dir,
            None => return Ok(()),
        };

        for entry in fs::read_dir(refs_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            // Leftovers from an interrupted write
            if name.starts_with('.') {
                continue;
            }
            let content = fs::read_to_string(entry.path())?;
            let oid = ObjectId::from_hex(&content)
                .map_err(|_| RefError::MalformedHead(name.clone()))?;
            self.heads.insert(name, oid);
        }

        Ok(())
    }

    /// Move a dataset head to `commit`, creating the dataset if needed
    pub fn update_head(&self, name: &str, commit: ObjectId) -> Result<(), RefError> {
        validate_dataset_name(name)?;

        if let Some(ref refs_dir) = self.refs_dir {
            write_atomic(&refs_dir.join(name), format!("{}\n", commit.to_hex()).as_bytes())?;
        }
        self.heads.insert(name.to_string(), commit);
        Ok(())
    }

    /// Current head commit of a dataset
    pub fn head(&self, name: &str) -> Option<ObjectId> {
        self.heads.get(name).map(|r| *r.value())
    }

    /// All dataset names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.heads.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for RefStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Validate a dataset name.
///
/// Names are a single path component of `[A-Za-z0-9._-]`, not starting or
/// ending with `.` and without `..`.
pub fn validate_dataset_name(name: &str) -> Result<(), RefError> {
    let invalid = |reason: &str| RefError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("empty name"));
    }

    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid("cannot start or end with '.'"));
    }

    if name.contains("..") {
        return Err(invalid("cannot contain '..'"));
    }

    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(invalid(&format!("cannot contain '{}'", c.escape_default())));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_updates() {
        let store = RefStore::in_memory();

        let oid1 = ObjectId::from_content(b"commit1");
        let oid2 = ObjectId::from_content(b"commit2");

        assert_eq!(store.head("ds"), None);
        store.update_head("ds", oid1).unwrap();
        store.update_head("ds", oid2).unwrap();
        assert_eq!(store.head("ds"), Some(oid2));
        assert_eq!(store.list(), vec!["ds".to_string()]);
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let oid = ObjectId::from_content(b"commit");

        RefStore::open(dir.path())
            .unwrap()
            .update_head("feed", oid)
            .unwrap();

        let on_disk =
            fs::read_to_string(dir.path().join("refs").join("datasets").join("feed")).unwrap();
        assert_eq!(on_disk, format!("{}\n", oid.to_hex()));

        let reopened = RefStore::open(dir.path()).unwrap();
        assert_eq!(reopened.head("feed"), Some(oid));
    }

    #[test]
    fn test_malformed_head_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let refs_dir = dir.path().join("refs").join("datasets");
        fs::create_dir_all(&refs_dir).unwrap();
        fs::write(refs_dir.join("broken"), "not-a-hash\n").unwrap();

        assert!(matches!(
            RefStore::open(dir.path()),
            Err(RefError::MalformedHead(name)) if name == "broken"
        ));
    }

    #[test]
    fn test_dataset_name_validation() {
        assert!(validate_dataset_name("ds").is_ok());
        assert!(validate_dataset_name("daily-feed_2").is_ok());
        assert!(validate_dataset_name("v1.0").is_ok());

        assert!(validate_dataset_name("").is_err());
        assert!(validate_dataset_name(".hidden").is_err());
        assert!(validate_dataset_name("bad..name").is_err());
        assert!(validate_dataset_name("has space").is_err());
        assert!(validate_dataset_name("nested/name").is_err());
    }

    #[test]
    fn test_invalid_name_is_not_written() {
        let store = RefStore::in_memory();
        let oid = ObjectId::from_content(b"commit");
        assert!(store.update_head("a/b", oid).is_err());
        assert!(store.list().is_empty());
    }
}
