// SPDX-License-Identifier: MPL-2.0
//! View states of the resource viewer and their render-ready description.

use super::handle::{DisplayHandle, HandleId};
use crate::error::FetchError;

/// Mutually exclusive states of the viewer.
#[derive(Debug, Default)]
pub enum ViewState {
    /// No file reference was supplied.
    #[default]
    NoFile,
    /// A request for the current file is in flight.
    Loading,
    /// The image arrived and is ready to draw.
    Loaded(DisplayHandle),
    /// The request failed; no automatic retry happens.
    Failed(FetchError),
}

impl ViewState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    #[must_use]
    pub fn handle(&self) -> Option<&DisplayHandle> {
        match self {
            ViewState::Loaded(handle) => Some(handle),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            ViewState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// What the viewer shows, with all text already translated.
///
/// Rendering is a pure function of this value, which makes it the thing to
/// compare when checking what a given state looks like.
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    NotAvailable { message: String },
    Retrieving { caption: String },
    Card { title: String, handle: HandleId },
    Failed { title: String, reason: String, retry_label: String },
}
