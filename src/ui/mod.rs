// SPDX-License-Identifier: MPL-2.0
pub mod design_tokens;
pub mod file_bar;
pub mod resource_viewer;
pub mod styles;
pub mod theming;
pub mod widgets;
