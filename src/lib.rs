// SPDX-License-Identifier: MPL-2.0
//! `matrix_lens` shows the confusion-matrix image of an experiment result
//! stored on a lab server, built with the Iced GUI framework.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod ui;
