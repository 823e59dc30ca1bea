// SPDX-License-Identifier: MPL-2.0
//! Display handles for fetched image bytes and the ledger that tracks them.

use crate::error::FetchError;
use iced::widget::image;
use image_rs::ImageFormat;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Image bytes turned into something Iced can draw, not yet owned by a viewer.
#[derive(Debug, Clone)]
pub struct Payload {
    image: image::Handle,
    format: ImageFormat,
    byte_len: usize,
}

impl Payload {
    /// Wraps a downloaded body, rejecting bytes that are not a known image format.
    pub fn from_bytes(body: Vec<u8>) -> Result<Self, FetchError> {
        let format = image_rs::guess_format(&body).map_err(|_| FetchError::NotAnImage)?;
        let byte_len = body.len();
        Ok(Self {
            image: image::Handle::from_bytes(body),
            format,
            byte_len,
        })
    }

    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }
}

/// Identifies one display handle for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

#[derive(Debug, Default)]
struct LedgerInner {
    live: AtomicUsize,
    next_id: AtomicU64,
}

/// Counts display handles that have been created but not yet released.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct HandleLedger {
    inner: Arc<LedgerInner>,
}

impl HandleLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles currently alive.
    #[must_use]
    pub fn live(&self) -> usize {
        self.inner.live.load(Ordering::Acquire)
    }

    /// Takes ownership of a payload, registering it as a live handle.
    #[must_use]
    pub fn register(&self, payload: Payload) -> DisplayHandle {
        let id = HandleId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.live.fetch_add(1, Ordering::AcqRel);
        DisplayHandle {
            id,
            payload,
            ledger: Arc::clone(&self.inner),
        }
    }
}

/// A registered image, owned by exactly one viewer state.
///
/// Dropping the handle releases it; [`DisplayHandle::release`] does the same
/// explicitly.
#[derive(Debug)]
pub struct DisplayHandle {
    id: HandleId,
    payload: Payload,
    ledger: Arc<LedgerInner>,
}

impl DisplayHandle {
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.id
    }

    #[must_use]
    pub fn image(&self) -> &image::Handle {
        &self.payload.image
    }

    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.payload.format
    }

    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.payload.byte_len
    }

    pub fn release(self) {
        tracing::debug!(handle = ?self.id, bytes = self.byte_len(), "releasing display handle");
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        self.ledger.live.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// PNG signature followed by filler; enough for format sniffing.
    pub(crate) fn png_bytes() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0u8; 24]);
        bytes
    }

    #[test]
    fn png_body_is_accepted() {
        let payload = Payload::from_bytes(png_bytes()).expect("png payload");
        assert_eq!(payload.format(), ImageFormat::Png);
        assert_eq!(payload.byte_len(), 32);
    }

    #[test]
    fn html_error_page_is_not_an_image() {
        let body = b"<!doctype html><title>oops</title>".to_vec();
        assert_eq!(
            Payload::from_bytes(body).unwrap_err(),
            FetchError::NotAnImage
        );
    }

    #[test]
    fn ledger_counts_live_handles() {
        let ledger = HandleLedger::new();
        let first = ledger.register(Payload::from_bytes(png_bytes()).unwrap());
        let second = ledger.register(Payload::from_bytes(png_bytes()).unwrap());
        assert_eq!(ledger.live(), 2);
        assert_ne!(first.id(), second.id());

        first.release();
        assert_eq!(ledger.live(), 1);
        drop(second);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn unregistered_payloads_are_not_counted() {
        let ledger = HandleLedger::new();
        let payload = Payload::from_bytes(png_bytes()).unwrap();
        drop(payload);
        assert_eq!(ledger.live(), 0);
    }
}
