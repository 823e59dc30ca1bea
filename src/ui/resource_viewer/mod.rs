// SPDX-License-Identifier: MPL-2.0
//! Confusion-matrix viewer bound to one file record at a time.
//!
//! ## States
//!
//! - no file: static "not available" message, no network traffic
//! - loading: spinner while the single request for the current id runs
//! - loaded: titled card with the image
//! - failed: reason and a manual retry button
//!
//! Changing the file id supersedes the previous request (its cancellation
//! token fires and its result is discarded) and releases the previous image.

pub mod component;
pub mod handle;
pub mod loader;
pub mod state;

pub use component::{Effect, FetchRequest, Message, State};
pub use handle::{DisplayHandle, HandleId, HandleLedger, Payload};
pub use state::{Presentation, ViewState};
