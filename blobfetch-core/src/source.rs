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

//! Reading raw bytes from an [`Origin`].

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::origin::{CacheToken, Origin};
use crate::progress::Progress;
use reqwest::header::{HeaderMap, IF_NONE_MATCH};
use reqwest::StatusCode;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info};

const READ_CHUNK: usize = 64 * 1024;

/// What a source produced
#[derive(Debug)]
pub enum SourceResponse {
    /// Bytes from stdin or a file
    Local { bytes: Vec<u8> },
    Http(HttpResponse),
}

#[derive(Debug)]
pub struct HttpResponse {
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Empty for a 304
    pub body: Vec<u8>,
    /// Whether the request carried `If-None-Match`
    pub conditional: bool,
}

/// Reads stdin, files and URLs
#[derive(Debug, Clone)]
pub struct SourceReader {
    client: reqwest::Client,
    progress_step_percent: u8,
}

impl SourceReader {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            progress_step_percent: config.progress_step_percent,
        })
    }

    /// Read the full content of `origin`.
    ///
    /// `stdin` is only consumed for [`Origin::Stdin`]. `token` is only used
    /// for URLs, where it becomes the `If-None-Match` header.
    pub async fn read<R>(
        &self,
        origin: &Origin,
        token: Option<&CacheToken>,
        stdin: R,
    ) -> Result<SourceResponse, FetchError>
    where
        R: AsyncRead + Unpin,
    {
        match origin {
            Origin::Stdin => {
                let mut progress = Progress::new(None, self.progress_step_percent);
                let bytes = read_all(stdin, &mut progress)
                    .await
                    .map_err(|e| FetchError::io("stdin", e))?;
                Ok(SourceResponse::Local { bytes })
            }
            Origin::File { path } => {
                let bytes = self.read_file(path).await?;
                Ok(SourceResponse::Local { bytes })
            }
            Origin::Url { address } => {
                let response = self.fetch_url(address, token).await?;
                Ok(SourceResponse::Http(response))
            }
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        let what = path.display().to_string();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| FetchError::io(what.clone(), e))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| FetchError::io(what.clone(), e))?
            .len();

        let mut progress = Progress::new(Some(len), self.progress_step_percent);
        read_all(file, &mut progress)
            .await
            .map_err(|e| FetchError::io(what, e))
    }

    async fn fetch_url(
        &self,
        address: &str,
        token: Option<&CacheToken>,
    ) -> Result<HttpResponse, FetchError> {
        let mut request = self.client.get(address);
        if let Some(token) = token {
            debug!("Sending If-None-Match: {}", token);
            request = request.header(IF_NONE_MATCH, token.as_str());
        }

        let mut response = request
            .send()
            .await
            .map_err(|e| FetchError::network(address, e))?;
        let status = response.status();
        info!("GET {} -> {}", address, status);

        if status == StatusCode::NOT_MODIFIED {
            return Ok(HttpResponse {
                url: address.to_string(),
                status,
                headers: response.headers().clone(),
                body: Vec::new(),
                conditional: token.is_some(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                url: address.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = response.headers().clone();
        let mut progress = Progress::new(response.content_length(), self.progress_step_percent);
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::network(address, e))?
        {
            body.extend_from_slice(&chunk);
            progress.advance(chunk.len() as u64);
        }

        Ok(HttpResponse {
            url: address.to_string(),
            status,
            headers,
            body,
            conditional: token.is_some(),
        })
    }
}

async fn read_all<R>(mut reader: R, progress: &mut Progress) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        progress.advance(n as u64);
    }
    Ok(bytes)
}
