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

//! Blobfetch Storage Layer
//!
//! A content-addressable store of immutable objects with named, linearly
//! versioned datasets on top.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Database                              │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐     ┌─────────────┐                      │
//! │  │    Blob     │◄────│   Commit    │◄── parent ── Commit  │
//! │  │   (value)   │     │ (meta, h=n) │                      │
//! │  └─────────────┘     └─────────────┘                      │
//! │         │                   │                             │
//! │         ▼                   ▼                             │
//! │  ┌────────────────────────────────────────────┐           │
//! │  │   objects/ (BLAKE3 addressed, write-once)  │           │
//! │  └────────────────────────────────────────────┘           │
//! │  ┌────────────────────────────────────────────┐           │
//! │  │   refs/datasets/<name> -> head commit      │           │
//! │  └────────────────────────────────────────────┘           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use blobfetch_storage::{Blob, CommitMetadata, Database};
//!
//! let db = Database::open("./store")?;
//! let ds = db.dataset("ds")?;
//! let height = ds.commit(&Blob::new("abcdef"), CommitMetadata::dated(chrono::Utc::now()))?;
//! assert_eq!(height, ds.head_height()?);
//! # Ok::<(), blobfetch_storage::DatabaseError>(())
//! ```

pub mod database;
pub mod locator;
pub mod objects;
pub mod refs;
pub mod store;

pub use database::{open_or_create_dataset, CommitInfo, Database, DatabaseError, Dataset, LogEntry};
pub use locator::{DatasetLocator, LocatorError};
pub use objects::{Blob, Commit, CommitMetadata, ObjectId, ObjectType, ParseError, StoreObject};
pub use refs::{RefError, RefStore};
pub use store::{ObjectStore, StoreError, StoreStats};
