// SPDX-License-Identifier: MPL-2.0
//! HTTP client for `GET /api/v1/files/{id}`.

use super::FileId;
use crate::config::{ServerConfig, USER_AGENT};
use crate::error::FetchError;
use futures_util::StreamExt;
use hyper::ext::ReasonPhrase;
use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation flag shared between a viewer and its in-flight request.
pub type CancellationToken = Arc<AtomicBool>;

/// Creates a fresh, not-yet-cancelled token.
#[must_use]
pub fn new_token() -> CancellationToken {
    Arc::new(AtomicBool::new(false))
}

/// Checks if the token has been cancelled.
#[inline]
pub fn is_cancelled(token: &CancellationToken) -> bool {
    token.load(Ordering::Relaxed)
}

pub fn cancel(token: &CancellationToken) {
    token.store(true, Ordering::Relaxed);
}

const FILES_PATH: [&str; 3] = ["api", "v1", "files"];

/// Reads file records from the lab server.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FilesClient {
    http: reqwest::Client,
    base_url: Url,
    max_body_bytes: u64,
}

impl FilesClient {
    /// Builds a client for the server described by `server`.
    pub fn new(server: &ServerConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&server.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", server.base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!(
                "{}: expected an http(s) URL",
                server.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .connect_timeout(server.connect_timeout())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            max_body_bytes: server.max_image_bytes(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the URL of a file record. The identifier is encoded as a
    /// single path segment, so `/` or `?` inside it cannot escape.
    pub fn file_url(&self, id: &FileId) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                FetchError::InvalidUrl(format!("{}: cannot hold a path", self.base_url))
            })?;
            segments.pop_if_empty();
            segments.extend(FILES_PATH);
            segments.push(id.as_str());
        }
        Ok(url)
    }

    /// Downloads the full body of a file record.
    ///
    /// Returns `Ok(None)` when `cancel` fires before the body is complete;
    /// the partial body is dropped. Any status of 400 or above is an error.
    pub async fn fetch(
        &self,
        id: &FileId,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<u8>>, FetchError> {
        let url = self.file_url(id)?;
        tracing::debug!(%url, "requesting file");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        // Codes above 599 are legal on the wire and still failures here.
        if status.as_u16() >= 400 {
            let reason = response
                .extensions()
                .get::<ReasonPhrase>()
                .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok());
            return Err(FetchError::from_status(status, reason));
        }

        if is_cancelled(cancel) {
            return Ok(None);
        }

        let limit = self.max_body_bytes;
        if let Some(length) = response.content_length() {
            if length > limit {
                return Err(FetchError::TooLarge { limit });
            }
        }

        let mut body = Vec::with_capacity(
            response
                .content_length()
                .and_then(|len| usize::try_from(len).ok())
                .unwrap_or(0),
        );
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            if is_cancelled(cancel) {
                return Ok(None);
            }
            let chunk = chunk.map_err(|e| FetchError::Body(e.to_string()))?;
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(file_id = %id, bytes = body.len(), "file downloaded");
        Ok(Some(body))
    }
}
