// SPDX-License-Identifier: MPL-2.0
//! Asynchronous part of a viewer fetch.

use super::handle::Payload;
use crate::api::files::is_cancelled;
use crate::api::{CancellationToken, FileId, FilesClient};
use crate::error::FetchError;

/// Downloads a file record and prepares it for display.
///
/// Returns `Ok(None)` if `token` was cancelled at any checkpoint; the
/// caller must not touch viewer state in that case.
pub async fn load(
    client: FilesClient,
    id: FileId,
    token: CancellationToken,
) -> Result<Option<Payload>, FetchError> {
    let Some(body) = client.fetch(&id, &token).await? else {
        tracing::debug!(file_id = %id, "fetch cancelled during download");
        return Ok(None);
    };
    if is_cancelled(&token) {
        return Ok(None);
    }
    Payload::from_bytes(body).map(Some)
}
