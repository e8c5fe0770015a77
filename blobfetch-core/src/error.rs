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

//! Errors from fetching and committing content.
//!
//! None of these are retried. Every variant aborts the ingest before the
//! dataset head moves.

use blobfetch_storage::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Local file missing or unreadable, or stdin read failure
    #[error("failed to read {what}: {source}")]
    Io {
        what: String,
        source: std::io::Error,
    },

    /// Connection-level failure reaching a URL
    #[error("request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    /// Response status that is neither 2xx nor an expected 304
    #[error("could not load {url}: HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("invalid source {source_arg:?}: {reason}")]
    InvalidSource { source_arg: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl FetchError {
    pub(crate) fn io(what: impl Into<String>, source: std::io::Error) -> Self {
        FetchError::Io {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn network(url: &str, source: reqwest::Error) -> Self {
        FetchError::Network {
            url: url.to_string(),
            source,
        }
    }
}
