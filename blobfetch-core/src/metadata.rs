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

//! Commit metadata for an ingest.

use crate::origin::{CacheToken, Origin};
use blobfetch_storage::CommitMetadata;
use chrono::{DateTime, Utc};

/// Builds [`CommitMetadata`]. `date` is always set; the other fields only
/// when they apply.
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    metadata: CommitMetadata,
}

impl MetadataBuilder {
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            metadata: CommitMetadata::dated(date),
        }
    }

    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.metadata.file = Some(path.into());
        self
    }

    pub fn url(mut self, address: impl Into<String>) -> Self {
        self.metadata.url = Some(address.into());
        self
    }

    pub fn etag(mut self, token: Option<&CacheToken>) -> Self {
        self.metadata.etag = token.map(|t| t.as_str().to_string());
        self
    }

    pub fn build(self) -> CommitMetadata {
        self.metadata
    }

    /// Metadata for content read from `origin`. `token` is recorded for URLs only.
    ///
    /// `file` is the path as given. Origins resolved with
    /// [`Origin::from_source`] always hold UTF-8 paths; a non-UTF-8 path
    /// built by hand is recorded with invalid sequences replaced.
    pub fn for_origin(
        origin: &Origin,
        date: DateTime<Utc>,
        token: Option<&CacheToken>,
    ) -> CommitMetadata {
        let builder = Self::new(date);
        match origin {
            Origin::Stdin => builder.build(),
            Origin::File { path } => builder.file(path.to_string_lossy()).build(),
            Origin::Url { address } => builder.url(address.as_str()).etag(token).build(),
        }
    }
}
