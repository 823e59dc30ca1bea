// SPDX-License-Identifier: MPL-2.0
//! Localization using Fluent.
//!
//! Translation files are embedded from `assets/i18n/` at build time. The
//! active locale comes from the CLI, then the config file, then the OS,
//! falling back to `en-US`.

pub mod fluent;
