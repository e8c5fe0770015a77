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

//! Where ingested content comes from, and the cache token a URL can carry.

use crate::error::FetchError;
use blobfetch_storage::CommitMetadata;
use std::fmt;
use std::path::PathBuf;

/// Source of the content for one ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Stdin,
    File { path: PathBuf },
    /// `address` is kept exactly as given so it can be recorded verbatim
    Url { address: String },
}

impl Origin {
    /// Resolve the origin from the invocation arguments.
    ///
    /// `source` is required unless reading from stdin, and must be absent
    /// when reading from stdin.
    pub fn resolve(source: Option<&str>, from_stdin: bool) -> Result<Self, FetchError> {
        match (source, from_stdin) {
            (None, true) => Ok(Origin::Stdin),
            (Some(source), false) => Self::from_source(source),
            (Some(source), true) => Err(FetchError::InvalidSource {
                source_arg: source.to_string(),
                reason: "a source cannot be combined with stdin".to_string(),
            }),
            (None, false) => Err(FetchError::InvalidSource {
                source_arg: String::new(),
                reason: "expected a file path or URL".to_string(),
            }),
        }
    }

    /// A URL when the argument carries an `http` or `https` scheme, a file
    /// path otherwise.
    pub fn from_source(source: &str) -> Result<Self, FetchError> {
        if source.is_empty() {
            return Err(FetchError::InvalidSource {
                source_arg: String::new(),
                reason: "empty source".to_string(),
            });
        }

        if has_http_scheme(source) {
            url::Url::parse(source).map_err(|e| FetchError::InvalidSource {
                source_arg: source.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Origin::Url {
                address: source.to_string(),
            });
        }

        Ok(Origin::File {
            path: PathBuf::from(source),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Origin::Stdin => "stdin",
            Origin::File { .. } => "file",
            Origin::Url { .. } => "url",
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Origin::Url { .. })
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Stdin => f.write_str("<stdin>"),
            Origin::File { path } => write!(f, "{}", path.display()),
            Origin::Url { address } => f.write_str(address),
        }
    }
}

fn has_http_scheme(source: &str) -> bool {
    source
        .split_once("://")
        .is_some_and(|(scheme, _)| {
            scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
        })
}

/// Opaque cache token (an ETag) returned by a server. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheToken(String);

impl CacheToken {
    /// `None` for an empty token, which cannot be sent back
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Token stored in a previous commit's metadata, if any
    pub fn from_metadata(metadata: &CommitMetadata) -> Option<Self> {
        metadata.etag.as_deref().and_then(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
