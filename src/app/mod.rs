// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration.
//!
//! The `App` struct wires the file bar, the resource viewer, localization
//! and settings together, and turns viewer effects into Iced tasks.

mod message;
pub mod paths;
mod subscription;

pub use message::{Flags, Message};

use crate::api::{FileReference, FilesClient};
use crate::config::{self, Config};
use crate::error::FetchError;
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::spacing;
use crate::ui::file_bar;
use crate::ui::resource_viewer::{self, loader, Effect, HandleLedger};
use crate::ui::theming::ThemeMode;
use iced::widget::{Column, Container, Text};
use iced::{window, Element, Length, Subscription, Task, Theme};
use std::fmt;

pub const WINDOW_DEFAULT_HEIGHT: u32 = 720;
pub const WINDOW_DEFAULT_WIDTH: u32 = 760;
pub const MIN_WINDOW_HEIGHT: u32 = 360;
pub const MIN_WINDOW_WIDTH: u32 = 420;

/// Root Iced application state.
pub struct App {
    pub i18n: I18n,
    theme_mode: ThemeMode,
    client: Result<FilesClient, FetchError>,
    file_bar: file_bar::State,
    viewer: resource_viewer::State,
    /// i18n key of a startup warning (e.g. unreadable settings).
    startup_warning: Option<String>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("file", &self.viewer.file())
            .field("loading", &self.viewer.is_loading())
            .finish()
    }
}

/// Builds the window settings.
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        exit_on_close_request: false,
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    // iced requires an Fn boot closure; flags are consumed on the first call
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state.borrow_mut().take().unwrap_or_default();
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

impl App {
    /// Builds the application from flags, loading config from disk.
    fn new(flags: Flags) -> (Self, Task<Message>) {
        paths::init_cli_override(flags.config_dir.clone());
        let (config, warning) = config::load();
        Self::with_config(flags, config, warning)
    }

    /// Builds the application from an already loaded config.
    ///
    /// Returns the startup task, which fetches the initial file if one was given.
    pub fn with_config(
        flags: Flags,
        mut config: Config,
        startup_warning: Option<String>,
    ) -> (Self, Task<Message>) {
        if let Some(server) = flags.server {
            config.server.base_url = server;
        }
        let i18n = I18n::new(flags.lang, &config);

        let client = FilesClient::new(&config.server);
        match &client {
            Ok(client) => tracing::info!(server = %client.base_url(), "using lab server"),
            Err(err) => tracing::error!(%err, "lab server is misconfigured"),
        }

        let initial_file = flags.file_id.as_deref().and_then(FileReference::parse);
        let (viewer, effect) = resource_viewer::State::mount(initial_file, HandleLedger::new());

        let app = App {
            i18n,
            theme_mode: config.general.theme_mode,
            client,
            file_bar: file_bar::State::with_input(flags.file_id.unwrap_or_default()),
            viewer,
            startup_warning,
        };
        let task = app.run_effect(effect);
        (app, task)
    }

    fn title(&self) -> String {
        match self.viewer.file() {
            Some(file) => self
                .i18n
                .tr_with_args("window-title-with-file", &[("id", file.id.as_str())]),
            None => self.i18n.tr("window-title"),
        }
    }

    fn theme(&self) -> Theme {
        self.theme_mode.to_theme()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            subscription::create_event_subscription(),
            subscription::create_tick_subscription(self.viewer.is_loading()),
        ])
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Viewer(msg) => {
                let effect = self.viewer.handle(msg);
                self.run_effect(effect)
            }
            Message::FileBar(msg) => match self.file_bar.handle(msg) {
                file_bar::Event::None => Task::none(),
                file_bar::Event::FileSelected(file) => {
                    let effect = self
                        .viewer
                        .handle(resource_viewer::Message::FileChanged(file));
                    self.run_effect(effect)
                }
            },
            Message::Tick => {
                self.viewer.handle(resource_viewer::Message::SpinnerTick);
                Task::none()
            }
            Message::WindowCloseRequested(id) => {
                self.viewer.teardown();
                tracing::info!("closing window");
                window::close(id)
            }
        }
    }

    /// Turns a viewer effect into the task that performs it.
    fn run_effect(&self, effect: Effect) -> Task<Message> {
        let Effect::Fetch(request) = effect else {
            return Task::none();
        };
        let generation = request.generation;
        let to_message = move |result| {
            Message::Viewer(resource_viewer::Message::Fetched { generation, result })
        };

        match &self.client {
            Ok(client) => Task::perform(
                loader::load(client.clone(), request.file.id, request.token),
                to_message,
            ),
            Err(err) => Task::done(to_message(Err(err.clone()))),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut content = Column::new()
            .spacing(spacing::MD)
            .padding(spacing::LG)
            .push(self.file_bar.view(&self.i18n).map(Message::FileBar));

        if let Some(key) = &self.startup_warning {
            content = content.push(Text::new(self.i18n.tr(key)));
        }

        content = content.push(self.viewer.view(&self.i18n).map(Message::Viewer));

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    #[must_use]
    pub fn viewer(&self) -> &resource_viewer::State {
        &self.viewer
    }
}
