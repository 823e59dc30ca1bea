// SPDX-License-Identifier: MPL-2.0
//! Default values for configuration settings.

/// Lab server queried when no `[server] base_url` is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5080";

/// Largest image body accepted from the server (32 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// Smallest accepted body limit; anything lower cannot hold a real plot.
pub const MIN_MAX_IMAGE_BYTES: u64 = 1024;

/// Seconds allowed for establishing the TCP/TLS connection.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("MatrixLens/", env!("CARGO_PKG_VERSION"));
