// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use crate::ui::file_bar;
use crate::ui::resource_viewer;

/// Top-level messages consumed by `App::update`.
#[derive(Debug, Clone)]
pub enum Message {
    Viewer(resource_viewer::Message),
    FileBar(file_bar::Message),
    /// Periodic tick while the viewer is loading.
    Tick,
    /// Window close was requested (user clicked X or pressed Alt+F4).
    WindowCloseRequested(iced::window::Id),
}

/// Runtime flags passed from the launcher.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    /// Optional language override from `--lang`.
    pub lang: Option<String>,
    /// Optional server override from `--server`.
    pub server: Option<String>,
    /// Optional config directory from `--config-dir`.
    pub config_dir: Option<String>,
    /// File identifier to show on startup.
    pub file_id: Option<String>,
}
