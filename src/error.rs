// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Fetch(FetchError),
}

/// Reasons a file record could not be turned into a displayable image.
/// Used to pick a localized message for the failed view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Server answered with a status code of 400 or above.
    Status { code: u16, text: String },

    /// Request never produced a response (connection refused, DNS, TLS...).
    Transport(String),

    /// Response arrived but its body could not be read to the end.
    Body(String),

    /// Body grew past the configured size limit (in bytes).
    TooLarge { limit: u64 },

    /// Body is not in an image format we can display.
    NotAnImage,

    /// Base URL or file identifier could not form a request URL.
    InvalidUrl(String),
}

impl FetchError {
    /// Builds a status error, preferring the reason phrase the server sent
    /// over the canonical one.
    pub fn from_status(status: reqwest::StatusCode, reason: Option<&str>) -> Self {
        let text = reason
            .filter(|phrase| !phrase.trim().is_empty())
            .or_else(|| status.canonical_reason())
            .unwrap_or_default();
        FetchError::Status {
            code: status.as_u16(),
            text: text.to_string(),
        }
    }

    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            FetchError::Status { code, .. } if *code == 404 => "viewer-error-not-found",
            FetchError::Status { .. } => "viewer-error-status",
            FetchError::Transport(_) => "viewer-error-transport",
            FetchError::Body(_) => "viewer-error-body",
            FetchError::TooLarge { .. } => "viewer-error-too-large",
            FetchError::NotAnImage => "viewer-error-not-an-image",
            FetchError::InvalidUrl(_) => "viewer-error-invalid-url",
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status { code, text } => write!(f, "{}: {}", code, text),
            FetchError::Transport(msg) => write!(f, "Request failed: {}", msg),
            FetchError::Body(msg) => write!(f, "Failed to read response body: {}", msg),
            FetchError::TooLarge { limit } => {
                write!(f, "Response body exceeds {} bytes", limit)
            }
            FetchError::NotAnImage => write!(f, "Response body is not a supported image"),
            FetchError::InvalidUrl(msg) => write!(f, "Invalid request URL: {}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Fetch(e) => write!(f, "Fetch Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Error::Fetch(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
