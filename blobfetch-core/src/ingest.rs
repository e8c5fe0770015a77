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

//! Fetch-and-commit orchestration.
//!
//! One ingest reads the origin, decides whether the content changed and, if
//! so, appends a commit. The head only moves after the whole body has been
//! read and stored, so any failure leaves the dataset as it was.

use crate::change::{Change, ChangeDetector};
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::metadata::MetadataBuilder;
use crate::origin::{CacheToken, Origin};
use crate::source::SourceReader;
use blobfetch_storage::{Blob, CommitInfo, Dataset, ObjectId};
use chrono::Utc;
use tokio::io::AsyncRead;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// Append a commit when content changed
    #[default]
    Commit,
    /// Store the value blob only; never touch the head
    WriteOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Server answered 304; nothing was written
    Unchanged { height: u64 },
    Committed(CommitInfo),
    /// Value stored without a commit
    Written { value: ObjectId },
}

impl IngestOutcome {
    /// Dataset height after the ingest, when known
    pub fn height(&self) -> Option<u64> {
        match self {
            IngestOutcome::Unchanged { height } => Some(*height),
            IngestOutcome::Committed(info) => Some(info.height),
            IngestOutcome::Written { .. } => None,
        }
    }
}

pub struct Ingestor {
    reader: SourceReader,
}

impl Ingestor {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            reader: SourceReader::new(config)?,
        })
    }

    /// Ingest `origin` into `dataset`.
    ///
    /// `stdin` is read only when `origin` is [`Origin::Stdin`].
    pub async fn ingest<R>(
        &self,
        origin: &Origin,
        dataset: &Dataset,
        stdin: R,
        mode: CommitMode,
    ) -> Result<IngestOutcome, FetchError>
    where
        R: AsyncRead + Unpin,
    {
        let previous = if origin.is_url() {
            dataset
                .head_metadata()?
                .and_then(|meta| CacheToken::from_metadata(&meta))
        } else {
            None
        };

        let response = self.reader.read(origin, previous.as_ref(), stdin).await?;

        let (body, token) = match ChangeDetector::classify(response)? {
            Change::Unchanged => {
                info!("Content unchanged since last fetch, no commit made");
                return Ok(IngestOutcome::Unchanged {
                    height: dataset.head_height()?,
                });
            }
            Change::Changed { body, token } => (body, token),
        };

        let value = Blob::new(body);
        match mode {
            CommitMode::WriteOnly => {
                let oid = dataset.write_value(&value)?;
                info!(value = %oid.short(), bytes = value.len(), "value written without commit");
                Ok(IngestOutcome::Written { value: oid })
            }
            CommitMode::Commit => {
                let metadata = MetadataBuilder::for_origin(origin, Utc::now(), token.as_ref());
                let commit = dataset.append(&value, metadata)?;
                info!(
                    dataset = %dataset.name(),
                    source = origin.kind(),
                    height = commit.height,
                    bytes = value.len(),
                    "committed"
                );
                Ok(IngestOutcome::Committed(commit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobfetch_storage::{Database, StoreObject};

    fn ingestor() -> Ingestor {
        Ingestor::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_stdin_commits_value() {
        let db = Database::in_memory();
        let ds = db.dataset("ds").unwrap();

        let outcome = ingestor()
            .ingest(&Origin::Stdin, &ds, &b"abcdef"[..], CommitMode::Commit)
            .await
            .unwrap();

        assert_eq!(outcome.height(), Some(1));
        assert_eq!(ds.head_value().unwrap().unwrap().as_text(), Some("abcdef"));
        let meta = ds.head_metadata().unwrap().unwrap();
        assert_eq!(meta.field_count(), 1);
    }

    #[tokio::test]
    async fn test_local_sources_always_commit() {
        let db = Database::in_memory();
        let ds = db.dataset("ds").unwrap();
        let ingestor = ingestor();

        for expected in 1..=3 {
            let outcome = ingestor
                .ingest(&Origin::Stdin, &ds, &b"same"[..], CommitMode::Commit)
                .await
                .unwrap();
            assert_eq!(outcome.height(), Some(expected));
        }
    }

    #[tokio::test]
    async fn test_write_only_leaves_head_alone() {
        let db = Database::in_memory();
        let ds = db.dataset("ds").unwrap();

        let outcome = ingestor()
            .ingest(&Origin::Stdin, &ds, &b"abcdef"[..], CommitMode::WriteOnly)
            .await
            .unwrap();

        let IngestOutcome::Written { value } = outcome else {
            panic!("expected write-only outcome, got {:?}", outcome);
        };
        assert_eq!(value, Blob::new("abcdef").object_id().unwrap());
        assert!(ds.head_id().is_none());
        assert!(db.store().exists(&value));
    }

    #[tokio::test]
    async fn test_failed_read_does_not_commit() {
        let db = Database::in_memory();
        let ds = db.dataset("ds").unwrap();
        let origin = Origin::File {
            path: "/definitely/not/here".into(),
        };

        let err = ingestor()
            .ingest(&origin, &ds, tokio::io::empty(), CommitMode::Commit)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Io { .. }));
        assert_eq!(ds.head_height().unwrap(), 0);
    }
}
