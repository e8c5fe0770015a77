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

//! Database - High-Level Dataset Interface
//!
//! A database pairs an [`ObjectStore`] with a [`RefStore`]. Datasets are
//! named, linear commit chains inside it. Committing writes the value blob
//! and the commit object first and moves the dataset head last, so a failed
//! commit never leaves the head pointing at a partial state.

use crate::locator::DatasetLocator;
use crate::objects::{Blob, Commit, CommitMetadata, ObjectId};
use crate::refs::{validate_dataset_name, RefError, RefStore};
use crate::store::{ObjectStore, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Database errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Commit not found: {0}")]
    CommitNotFound(ObjectId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Reference error: {0}")]
    Ref(#[from] RefError),
}

/// Result of appending a commit to a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitInfo {
    pub commit: ObjectId,
    pub value: ObjectId,
    pub height: u64,
}

/// Log entry for commit history
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub commit_id: ObjectId,
    pub value: ObjectId,
    pub height: u64,
    pub date: DateTime<Utc>,
}

/// A content-addressed database holding any number of datasets
pub struct Database {
    store: Arc<ObjectStore>,
    refs: Arc<RefStore>,
    commit_lock: Arc<Mutex<()>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the database rooted at `path`, creating it if it does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let store = ObjectStore::open(path)?;
        let refs = RefStore::open(path)?;
        tracing::debug!(path = %path.display(), datasets = refs.list().len(), "database opened");

        Ok(Self {
            store: Arc::new(store),
            refs: Arc::new(refs),
            commit_lock: Arc::new(Mutex::new(())),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create a database that lives only as long as this value
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(ObjectStore::in_memory()),
            refs: Arc::new(RefStore::in_memory()),
            commit_lock: Arc::new(Mutex::new(())),
            path: None,
        }
    }

    /// Get a dataset by name. A dataset without commits is valid and empty.
    pub fn dataset(&self, name: &str) -> Result<Dataset, DatabaseError> {
        validate_dataset_name(name)?;
        Ok(Dataset {
            name: name.to_string(),
            store: Arc::clone(&self.store),
            refs: Arc::clone(&self.refs),
            commit_lock: Arc::clone(&self.commit_lock),
        })
    }

    /// Names of all datasets that have at least one commit
    pub fn datasets(&self) -> Vec<String> {
        self.refs.list()
    }

    /// Get object store
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Open the store a locator names and return its dataset
pub fn open_or_create_dataset(locator: &DatasetLocator) -> Result<Dataset, DatabaseError> {
    Database::open(&locator.store_path)?.dataset(&locator.dataset)
}

/// A named, append-only chain of commits
#[derive(Clone)]
pub struct Dataset {
    name: String,
    store: Arc<ObjectStore>,
    refs: Arc<RefStore>,
    commit_lock: Arc<Mutex<()>>,
}

impl Dataset {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the newest commit, if any
    pub fn head_id(&self) -> Option<ObjectId> {
        self.refs.head(&self.name)
    }

    /// Newest commit, if any
    pub fn head(&self) -> Result<Option<Commit>, DatabaseError> {
        match self.head_id() {
            Some(oid) => Ok(Some(self.load_commit(&oid)?)),
            None => Ok(None),
        }
    }

    /// Metadata of the newest commit, if any
    pub fn head_metadata(&self) -> Result<Option<CommitMetadata>, DatabaseError> {
        Ok(self.head()?.map(|commit| commit.metadata))
    }

    /// Height of the newest commit, 0 for an empty dataset
    pub fn head_height(&self) -> Result<u64, DatabaseError> {
        Ok(self.head()?.map_or(0, |commit| commit.height))
    }

    /// Value blob of the newest commit, if any
    pub fn head_value(&self) -> Result<Option<Blob>, DatabaseError> {
        match self.head()? {
            Some(commit) => Ok(Some(self.store.get_required(&commit.value)?)),
            None => Ok(None),
        }
    }

    /// Write a blob into the store without committing it
    pub fn write_value(&self, value: &Blob) -> Result<ObjectId, DatabaseError> {
        Ok(self.store.put(value)?)
    }

    /// Append `value` with `metadata` as the new head. Returns the new height.
    pub fn commit(&self, value: &Blob, metadata: CommitMetadata) -> Result<u64, DatabaseError> {
        Ok(self.append(value, metadata)?.height)
    }

    /// Append `value` with `metadata` as the new head
    pub fn append(
        &self,
        value: &Blob,
        metadata: CommitMetadata,
    ) -> Result<CommitInfo, DatabaseError> {
        let _guard = self.commit_lock.lock();

        let value_oid = self.store.put(value)?;

        let commit = match self.head_id() {
            Some(parent) => {
                let parent_commit = self.load_commit(&parent)?;
                Commit::child(parent, parent_commit.height, value_oid, metadata)
            }
            None => Commit::initial(value_oid, metadata),
        };
        let height = commit.height;

        let commit_oid = self.store.put(&commit)?;
        self.refs.update_head(&self.name, commit_oid)?;

        tracing::debug!(
            dataset = %self.name,
            commit = %commit_oid.short(),
            height,
            "dataset head moved"
        );

        Ok(CommitInfo {
            commit: commit_oid,
            value: value_oid,
            height,
        })
    }

    /// Get commit history, newest first
    pub fn log(&self, max_count: Option<usize>) -> Result<Vec<LogEntry>, DatabaseError> {
        let mut entries = Vec::new();
        let mut current = self.head_id();

        while let Some(oid) = current {
            if max_count.is_some_and(|max| entries.len() >= max) {
                break;
            }

            let commit = self.load_commit(&oid)?;
            entries.push(LogEntry {
                commit_id: oid,
                value: commit.value,
                height: commit.height,
                date: commit.metadata.date,
            });

            current = commit.parent();
        }

        Ok(entries)
    }

    fn load_commit(&self, oid: &ObjectId) -> Result<Commit, DatabaseError> {
        self.store
            .get(oid)?
            .ok_or(DatabaseError::CommitNotFound(*oid))
    }
}
