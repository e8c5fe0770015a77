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

//! Deciding whether fetched content is new.
//!
//! A 304 always counts as unchanged. Local reads and URLs that never
//! returned an ETag are always treated as changed, even when the bytes match
//! the current head.

use crate::error::FetchError;
use crate::origin::CacheToken;
use crate::source::{HttpResponse, SourceResponse};
use reqwest::header::ETAG;
use reqwest::StatusCode;
use tracing::{debug, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum Change {
    Unchanged,
    Changed {
        body: Vec<u8>,
        /// ETag to record with the commit
        token: Option<CacheToken>,
    },
}

impl Change {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Change::Unchanged)
    }
}

pub struct ChangeDetector;

impl ChangeDetector {
    pub fn classify(response: SourceResponse) -> Result<Change, FetchError> {
        match response {
            SourceResponse::Local { bytes } => Ok(Change::Changed {
                body: bytes,
                token: None,
            }),
            SourceResponse::Http(response) => Self::classify_http(response),
        }
    }

    fn classify_http(response: HttpResponse) -> Result<Change, FetchError> {
        if response.status == StatusCode::NOT_MODIFIED {
            if !response.conditional {
                warn!("{} answered 304 to an unconditional request", response.url);
            }
            return Ok(Change::Unchanged);
        }

        if !response.status.is_success() {
            return Err(FetchError::Http {
                url: response.url,
                status: response.status.as_u16(),
            });
        }

        let token = response
            .headers
            .get(ETAG)
            .and_then(|value| value.to_str().ok())
            .and_then(CacheToken::new);
        debug!("Response ETag: {:?}", token);

        Ok(Change::Changed {
            body: response.body,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn http(status: u16, etag: Option<&str>, conditional: bool) -> SourceResponse {
        let mut headers = HeaderMap::new();
        if let Some(etag) = etag {
            headers.insert(ETAG, HeaderValue::from_str(etag).unwrap());
        }
        let status = StatusCode::from_u16(status).unwrap();
        SourceResponse::Http(HttpResponse {
            url: "http://example.com".to_string(),
            status,
            headers,
            body: if status.is_success() {
                b"abcdef".to_vec()
            } else {
                Vec::new()
            },
            conditional,
        })
    }

    #[test]
    fn test_local_content_is_always_changed() {
        let change = ChangeDetector::classify(SourceResponse::Local {
            bytes: b"abcdef".to_vec(),
        })
        .unwrap();
        assert_eq!(
            change,
            Change::Changed {
                body: b"abcdef".to_vec(),
                token: None
            }
        );
    }

    #[test]
    fn test_ok_with_etag_carries_token() {
        let change = ChangeDetector::classify(http(200, Some("xyz123"), false)).unwrap();
        match change {
            Change::Changed { body, token } => {
                assert_eq!(body, b"abcdef");
                assert_eq!(token.unwrap().as_str(), "xyz123");
            }
            Change::Unchanged => panic!("expected changed"),
        }
    }

    #[test]
    fn test_other_success_statuses_are_changed() {
        for status in [201, 203, 206] {
            let change = ChangeDetector::classify(http(status, Some("v7"), false)).unwrap();
            assert_eq!(
                change,
                Change::Changed {
                    body: b"abcdef".to_vec(),
                    token: CacheToken::new("v7"),
                },
                "status {status}"
            );
        }
    }

    #[test]
    fn test_empty_etag_is_dropped() {
        let change = ChangeDetector::classify(http(200, Some(""), false)).unwrap();
        assert!(matches!(change, Change::Changed { token: None, .. }));
    }

    #[test]
    fn test_conditional_not_modified_is_unchanged() {
        let change = ChangeDetector::classify(http(304, None, true)).unwrap();
        assert!(change.is_unchanged());
    }

    #[test]
    fn test_unconditional_not_modified_is_unchanged() {
        let change = ChangeDetector::classify(http(304, None, false)).unwrap();
        assert!(change.is_unchanged());
    }

    #[test]
    fn test_server_error_is_an_error() {
        let err = ChangeDetector::classify(http(500, None, true)).unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 500, .. }));
    }

    #[test]
    fn test_redirect_left_unfollowed_is_an_error() {
        let err = ChangeDetector::classify(http(302, None, false)).unwrap_err();
        assert!(matches!(err, FetchError::Http { status: 302, .. }));
    }
}
