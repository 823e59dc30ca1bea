// SPDX-License-Identifier: MPL-2.0
//! Input bar for choosing which file record the viewer shows.

use crate::api::FileReference;
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{sizing, spacing};
use iced::widget::{button, text_input, Row, Text};
use iced::{alignment, Element, Length};

#[derive(Debug, Clone, Default)]
pub struct State {
    input: String,
}

#[derive(Debug, Clone)]
pub enum Message {
    InputChanged(String),
    Submitted,
    Cleared,
}

/// Events for the host after handling a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    None,
    /// The user picked a file, or `None` to show nothing.
    FileSelected(Option<FileReference>),
}

impl State {
    #[must_use]
    pub fn with_input(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn handle(&mut self, message: Message) -> Event {
        match message {
            Message::InputChanged(value) => {
                self.input = value;
                Event::None
            }
            Message::Submitted => Event::FileSelected(FileReference::parse(&self.input)),
            Message::Cleared => {
                self.input.clear();
                Event::FileSelected(None)
            }
        }
    }

    pub fn view<'a>(&'a self, i18n: &I18n) -> Element<'a, Message> {
        let input = text_input(&i18n.tr("file-id-placeholder"), &self.input)
            .on_input(Message::InputChanged)
            .on_submit(Message::Submitted)
            .padding(spacing::XS)
            .width(Length::Fixed(sizing::INPUT_WIDTH));

        Row::new()
            .spacing(spacing::XS)
            .align_y(alignment::Vertical::Center)
            .push(input)
            .push(button(Text::new(i18n.tr("file-id-load-button"))).on_press(Message::Submitted))
            .push(button(Text::new(i18n.tr("file-id-clear-button"))).on_press(Message::Cleared))
            .into()
    }
}
