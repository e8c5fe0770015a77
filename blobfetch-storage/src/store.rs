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

//! Object Store - Content-Addressable Storage
//!
//! Persistent storage for blobs and commits. Each object lives in its own
//! file under `objects/<first 2 hex chars>/<remaining 62 hex chars>` and is
//! written exactly once. On read the id is recomputed from the stored bytes,
//! so corruption is reported instead of returned.

use crate::objects::{ObjectId, ObjectType, StoreObject};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(ObjectId),

    #[error("Corrupted object: {0}")]
    CorruptedObject(ObjectId),

    #[error("Type mismatch for {oid}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        oid: ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::SerializationError(e.to_string())
    }
}

/// Stored object with type prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredObject {
    obj_type: ObjectType,
    data: Vec<u8>,
}

/// Object store statistics for this process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub blobs_written: u64,
    pub commits_written: u64,
    pub bytes_written: u64,
}

/// Content-addressed object store.
///
/// Backed by a directory, or purely in memory when created with
/// [`ObjectStore::in_memory`]. Objects read or written during this process
/// are cached.
pub struct ObjectStore {
    /// `<store>/objects`, or `None` for in-memory
    objects_dir: Option<PathBuf>,
    cache: DashMap<ObjectId, StoredObject>,
    blobs_written: AtomicU64,
    commits_written: AtomicU64,
    bytes_written: AtomicU64,
}

impl ObjectStore {
    /// Create a store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::with_dir(None)
    }

    /// Open (creating if needed) the object directory under `root`
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let objects_dir = root.join("objects");
        fs::create_dir_all(&objects_dir)?;
        Ok(Self::with_dir(Some(objects_dir)))
    }

    fn with_dir(objects_dir: Option<PathBuf>) -> Self {
        Self {
            objects_dir,
            cache: DashMap::new(),
            blobs_written: AtomicU64::new(0),
            commits_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    fn object_path(&self, oid: &ObjectId) -> Option<PathBuf> {
        let hex = oid.to_hex();
        self.objects_dir
            .as_ref()
            .map(|dir| dir.join(&hex[..2]).join(&hex[2..]))
    }

    /// Store an object (idempotent - same content = same ID)
    pub fn put<T: StoreObject>(&self, obj: &T) -> Result<ObjectId, StoreError> {
        let data = obj.encode()?;
        let oid = ObjectId::from_content(&data);

        if self.cache.contains_key(&oid) {
            return Ok(oid);
        }

        let stored = StoredObject {
            obj_type: T::TYPE,
            data,
        };

        match self.object_path(&oid) {
            Some(path) if path.exists() => {}
            Some(path) => {
                write_atomic(&path, &bincode::serialize(&stored)?)?;
                self.record_write(T::TYPE, stored.data.len());
                tracing::trace!(oid = %oid.short(), kind = ?T::TYPE, "object written");
            }
            None => self.record_write(T::TYPE, stored.data.len()),
        }

        self.cache.insert(oid, stored);
        Ok(oid)
    }

    /// Get an object by ID
    pub fn get<T: StoreObject>(&self, oid: &ObjectId) -> Result<Option<T>, StoreError> {
        let cached = self.cache.get(oid).map(|entry| entry.value().clone());
        let stored = match cached {
            Some(stored) => stored,
            None => match self.load(oid)? {
                Some(stored) => {
                    self.cache.insert(*oid, stored.clone());
                    stored
                }
                None => return Ok(None),
            },
        };

        if stored.obj_type != T::TYPE {
            return Err(StoreError::TypeMismatch {
                oid: *oid,
                expected: T::TYPE,
                actual: stored.obj_type,
            });
        }

        Ok(Some(T::decode(&stored.data)?))
    }

    /// Get an object, returning error if not found
    pub fn get_required<T: StoreObject>(&self, oid: &ObjectId) -> Result<T, StoreError> {
        self.get(oid)?.ok_or(StoreError::NotFound(*oid))
    }

    /// Check if an object exists
    pub fn exists(&self, oid: &ObjectId) -> bool {
        self.cache.contains_key(oid) || self.object_path(oid).is_some_and(|p| p.exists())
    }

    fn record_write(&self, kind: ObjectType, len: usize) {
        let counter = match kind {
            ObjectType::Blob => &self.blobs_written,
            ObjectType::Commit => &self.commits_written,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(len as u64, Ordering::Relaxed);
    }

    /// Objects written by this handle
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            blobs_written: self.blobs_written.load(Ordering::Relaxed),
            commits_written: self.commits_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }

    fn load(&self, oid: &ObjectId) -> Result<Option<StoredObject>, StoreError> {
        let path = match self.object_path(oid) {
            Some(path) => path,
            None => return Ok(None),
        };

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredObject =
            bincode::deserialize(&raw).map_err(|_| StoreError::CorruptedObject(*oid))?;
        if ObjectId::from_content(&stored.data) != *oid {
            return Err(StoreError::CorruptedObject(*oid));
        }
        Ok(Some(stored))
    }
}

/// Write `bytes` to `path` via a temporary sibling and a rename, so readers
/// never observe a partially written file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().ok_or_else(|| {
        std::io::Error::new(ErrorKind::InvalidInput, "path has no parent")
    })?;
    fs::create_dir_all(dir)?;

    let tmp = dir.join(format!(".tmp-{}", uuid::Uuid::new_v4()));
    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
