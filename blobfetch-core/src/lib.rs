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

//! Blobfetch Core
//!
//! Reads content from stdin, a local file or a URL and commits it as a new
//! version of a dataset. URL fetches are conditional: the ETag recorded with
//! the previous commit is sent back as `If-None-Match`, and a 304 answer
//! leaves the dataset untouched.
//!
//! ```rust,no_run
//! use blobfetch_core::{CommitMode, FetchConfig, Ingestor, Origin};
//! use blobfetch_storage::{open_or_create_dataset, DatasetLocator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = open_or_create_dataset(&DatasetLocator::parse("./store::feed")?)?;
//! let origin = Origin::from_source("https://example.com/feed.json")?;
//! let ingestor = Ingestor::new(&FetchConfig::default())?;
//! let outcome = ingestor
//!     .ingest(&origin, &dataset, tokio::io::empty(), CommitMode::Commit)
//!     .await?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod change;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metadata;
pub mod origin;
pub mod progress;
pub mod source;

pub use change::{Change, ChangeDetector};
pub use config::FetchConfig;
pub use error::FetchError;
pub use ingest::{CommitMode, IngestOutcome, Ingestor};
pub use metadata::MetadataBuilder;
pub use origin::{CacheToken, Origin};
pub use source::{SourceReader, SourceResponse};
