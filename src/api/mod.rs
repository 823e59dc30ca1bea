// SPDX-License-Identifier: MPL-2.0
//! Access to the lab server's files API.
//!
//! Files are opaque binary records addressed by an identifier; this crate
//! only ever reads them with `GET /api/v1/files/{id}`.

pub mod files;

pub use files::{CancellationToken, FilesClient};

use std::fmt;
use std::str::FromStr;

/// Identifier of a file record on the lab server.
///
/// Always non-empty and free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileId(String);

/// Returned when a string cannot be used as a [`FileId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyFileId;

impl fmt::Display for EmptyFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file identifier is empty")
    }
}

impl std::error::Error for EmptyFileId {}

impl FileId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for FileId {
    type Err = EmptyFileId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(EmptyFileId)
        } else {
            Ok(FileId(trimmed.to_string()))
        }
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a file record, supplied by whoever hosts the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub id: FileId,
}

impl FileReference {
    #[must_use]
    pub fn new(id: FileId) -> Self {
        Self { id }
    }

    /// Parses a user-typed identifier; blank input means "no file".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok().map(Self::new)
    }
}
