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

//! Store Object Types
//!
//! Content-addressable objects: Blob and Commit.
//! All objects are immutable once created.

use blake3::Hasher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Object ID - BLAKE3 hash (32 bytes) of the object's encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub [u8; 32]);

impl ObjectId {
    /// Create from content (content-addressable)
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(content);
        Self(hasher.finalize().into())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex form (7 bytes, 14 chars)
    pub fn short(&self) -> String {
        hex::encode(&self.0[..7])
    }

    /// Full hex representation
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64 char hex string
    pub fn from_hex(hex_str: &str) -> Result<Self, ParseError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| ParseError::InvalidHex)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| ParseError::InvalidLength)?;
        Ok(Self(arr))
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parse errors for ObjectId
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid hex string")]
    InvalidHex,
    #[error("Invalid length (expected 32 bytes)")]
    InvalidLength,
}

/// Object type tag stored alongside every encoded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectType {
    /// Raw content
    Blob = 1,
    /// Dataset version with metadata and parent link
    Commit = 2,
}

/// Blob object - the raw bytes of one ingested value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Try to get content as UTF-8 text
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Provenance record attached to every commit.
///
/// `date` is always present. The remaining fields are optional and `None`
/// means the field is absent from the record, not that it is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMetadata {
    /// Time of the commit attempt
    pub date: DateTime<Utc>,
    /// Source path, for file ingests
    pub file: Option<String>,
    /// Source address, for URL ingests
    pub url: Option<String>,
    /// Cache token the server returned with the content
    pub etag: Option<String>,
}

impl CommitMetadata {
    /// Metadata carrying only a date
    pub fn dated(date: DateTime<Utc>) -> Self {
        Self {
            date,
            file: None,
            url: None,
            etag: None,
        }
    }

    /// Present fields as `(name, value)` pairs, `date` first
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("date", self.date.to_rfc3339())];
        if let Some(file) = &self.file {
            fields.push(("file", file.clone()));
        }
        if let Some(url) = &self.url {
            fields.push(("url", url.clone()));
        }
        if let Some(etag) = &self.etag {
            fields.push(("etag", etag.clone()));
        }
        fields
    }

    /// Number of present fields
    pub fn field_count(&self) -> usize {
        1 + usize::from(self.file.is_some())
            + usize::from(self.url.is_some())
            + usize::from(self.etag.is_some())
    }

    /// Look up a present field by name
    pub fn get(&self, name: &str) -> Option<String> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

/// Commit object - one version of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Blob holding the committed value
    pub value: ObjectId,
    /// Empty for the first commit, one entry otherwise
    pub parents: Vec<ObjectId>,
    /// Position in the chain, starting at 1
    pub height: u64,
    pub metadata: CommitMetadata,
}

impl Commit {
    /// Create initial commit (no parents)
    pub fn initial(value: ObjectId, metadata: CommitMetadata) -> Self {
        Self {
            value,
            parents: vec![],
            height: 1,
            metadata,
        }
    }

    /// Create a commit on top of `parent`
    pub fn child(
        parent: ObjectId,
        parent_height: u64,
        value: ObjectId,
        metadata: CommitMetadata,
    ) -> Self {
        Self {
            value,
            parents: vec![parent],
            height: parent_height + 1,
            metadata,
        }
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parents.first().copied()
    }

    /// Check if this is the initial commit
    pub fn is_initial(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Trait for objects held by the store
pub trait StoreObject: Sized + Serialize + for<'de> Deserialize<'de> {
    /// Object type constant
    const TYPE: ObjectType;

    /// Serialize to bytes
    fn encode(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    /// Deserialize from bytes
    fn decode(data: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(data)
    }

    /// Compute object ID
    fn object_id(&self) -> bincode::Result<ObjectId> {
        Ok(ObjectId::from_content(&self.encode()?))
    }
}

impl StoreObject for Blob {
    const TYPE: ObjectType = ObjectType::Blob;
}

impl StoreObject for Commit {
    const TYPE: ObjectType = ObjectType::Commit;
}
