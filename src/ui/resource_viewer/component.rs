// SPDX-License-Identifier: MPL-2.0
//! Resource viewer state machine and rendering.
//!
//! The viewer never performs I/O itself. Starting a download is returned as
//! [`Effect::Fetch`]; the host runs it (see [`super::loader::load`]) and feeds
//! the outcome back as [`Message::Fetched`].

use super::handle::{HandleLedger, Payload};
use super::state::{Presentation, ViewState};
use crate::api::files::{self, is_cancelled};
use crate::api::{CancellationToken, FileReference};
use crate::error::FetchError;
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{palette, sizing, spacing, typography};
use crate::ui::styles;
use crate::ui::widgets::spinner::{self, Spinner};
use iced::widget::{button, image, Column, Container, Image, Text};
use iced::{alignment, ContentFit, Element, Length};

/// Request currently owned by the viewer.
#[derive(Debug)]
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Everything the host needs to run one download.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub file: FileReference,
    pub generation: u64,
    pub token: CancellationToken,
}

#[derive(Debug, Clone)]
pub enum Message {
    /// The host supplied a (possibly different) file reference.
    FileChanged(Option<FileReference>),
    /// A download finished, successfully or not.
    Fetched {
        generation: u64,
        result: Result<Option<Payload>, FetchError>,
    },
    /// User asked to fetch the current file again after a failure.
    RetryRequested,
    /// Animate the spinner.
    SpinnerTick,
}

/// Side effects requested by the viewer.
#[derive(Debug, Clone)]
pub enum Effect {
    None,
    Fetch(FetchRequest),
}

#[derive(Debug)]
pub struct State {
    file: Option<FileReference>,
    view: ViewState,
    in_flight: Option<InFlight>,
    generation: u64,
    ledger: HandleLedger,
    spinner_rotation: f32,
}

impl State {
    /// Creates an empty viewer that shows the "not available" message.
    #[must_use]
    pub fn new(ledger: HandleLedger) -> Self {
        Self {
            file: None,
            view: ViewState::NoFile,
            in_flight: None,
            generation: 0,
            ledger,
            spinner_rotation: 0.0,
        }
    }

    /// Creates a viewer for `file`, returning the fetch to start if any.
    #[must_use]
    pub fn mount(file: Option<FileReference>, ledger: HandleLedger) -> (Self, Effect) {
        let mut state = Self::new(ledger);
        let effect = state.handle(Message::FileChanged(file));
        (state, effect)
    }

    pub fn handle(&mut self, message: Message) -> Effect {
        match message {
            Message::FileChanged(file) => self.set_file(file),
            Message::Fetched { generation, result } => {
                self.complete(generation, result);
                Effect::None
            }
            Message::RetryRequested => {
                if matches!(self.view, ViewState::Failed(_)) {
                    if let Some(file) = self.file.clone() {
                        tracing::info!(file_id = %file.id, "retrying fetch");
                        return self.start_fetch(file);
                    }
                }
                Effect::None
            }
            Message::SpinnerTick => {
                if self.view.is_loading() {
                    self.spinner_rotation = spinner::advance(self.spinner_rotation);
                }
                Effect::None
            }
        }
    }

    fn set_file(&mut self, file: Option<FileReference>) -> Effect {
        let same_id = match (&self.file, &file) {
            (Some(current), Some(next)) => current.id == next.id,
            _ => false,
        };
        if same_id {
            return Effect::None;
        }

        self.cancel_in_flight();
        self.file = file.clone();
        match file {
            Some(file) => self.start_fetch(file),
            None => {
                self.replace_view(ViewState::NoFile);
                Effect::None
            }
        }
    }

    fn start_fetch(&mut self, file: FileReference) -> Effect {
        self.cancel_in_flight();
        self.generation += 1;
        let token = files::new_token();
        self.in_flight = Some(InFlight {
            generation: self.generation,
            token: token.clone(),
        });
        self.spinner_rotation = 0.0;
        self.replace_view(ViewState::Loading);
        tracing::debug!(file_id = %file.id, generation = self.generation, "starting fetch");

        Effect::Fetch(FetchRequest {
            file,
            generation: self.generation,
            token,
        })
    }

    fn complete(&mut self, generation: u64, result: Result<Option<Payload>, FetchError>) {
        let current = self
            .in_flight
            .as_ref()
            .is_some_and(|req| req.generation == generation && !is_cancelled(&req.token));
        if !current {
            tracing::debug!(generation, "discarding stale fetch result");
            return;
        }

        match result {
            Ok(Some(payload)) => {
                self.in_flight = None;
                let handle = self.ledger.register(payload);
                tracing::info!(
                    handle = ?handle.id(),
                    format = ?handle.format(),
                    bytes = handle.byte_len(),
                    "confusion matrix loaded"
                );
                self.replace_view(ViewState::Loaded(handle));
            }
            // The loader only reports cancellation when the token fired,
            // which was ruled out above; keep waiting for a real result.
            Ok(None) => {}
            Err(err) => {
                self.in_flight = None;
                tracing::warn!(
                    file_id = ?self.file.as_ref().map(|f| f.id.to_string()),
                    %err,
                    "failed to fetch confusion matrix"
                );
                self.replace_view(ViewState::Failed(err));
            }
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(req) = self.in_flight.take() {
            files::cancel(&req.token);
            tracing::debug!(generation = req.generation, "cancelled in-flight fetch");
        }
    }

    fn replace_view(&mut self, next: ViewState) {
        if let ViewState::Loaded(handle) = std::mem::replace(&mut self.view, next) {
            handle.release();
        }
    }

    /// Cancels pending work and releases the displayed image.
    ///
    /// Safe to call more than once; also runs on drop.
    pub fn teardown(&mut self) {
        self.cancel_in_flight();
        self.replace_view(ViewState::NoFile);
        self.file = None;
    }

    #[must_use]
    pub fn file(&self) -> Option<&FileReference> {
        self.file.as_ref()
    }

    #[must_use]
    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.view.is_loading()
    }

    #[must_use]
    pub fn ledger(&self) -> &HandleLedger {
        &self.ledger
    }

    /// Describes what [`State::view`] draws for the current state.
    #[must_use]
    pub fn presentation(&self, i18n: &I18n) -> Presentation {
        match &self.view {
            ViewState::NoFile => Presentation::NotAvailable {
                message: i18n.tr("viewer-not-available"),
            },
            ViewState::Loading => Presentation::Retrieving {
                caption: i18n.tr("viewer-retrieving"),
            },
            ViewState::Loaded(handle) => Presentation::Card {
                title: i18n.tr("viewer-card-title"),
                handle: handle.id(),
            },
            ViewState::Failed(err) => Presentation::Failed {
                title: i18n.tr("viewer-error-title"),
                reason: failure_reason(err, i18n),
                retry_label: i18n.tr("viewer-retry-button"),
            },
        }
    }

    pub fn view<'a>(&'a self, i18n: &I18n) -> Element<'a, Message> {
        let content: Element<'a, Message> = match &self.view {
            ViewState::NoFile => Text::new(i18n.tr("viewer-not-available"))
                .size(typography::BODY)
                .color(palette::GRAY_400)
                .into(),
            ViewState::Loading => Column::new()
                .spacing(spacing::SM)
                .align_x(alignment::Horizontal::Center)
                .push(Spinner::new(palette::PRIMARY_500, self.spinner_rotation).into_element())
                .push(Text::new(i18n.tr("viewer-retrieving")).size(typography::CAPTION))
                .into(),
            ViewState::Loaded(handle) => {
                let matrix = Image::<image::Handle>::new(handle.image().clone())
                    .content_fit(ContentFit::Contain)
                    .width(Length::Fill);
                let card = Column::new()
                    .spacing(spacing::MD)
                    .push(Text::new(i18n.tr("viewer-card-title")).size(typography::TITLE_SM))
                    .push(matrix);
                Container::new(card)
                    .padding(spacing::MD)
                    .max_width(sizing::MATRIX_MAX_WIDTH)
                    .style(styles::container::card)
                    .into()
            }
            ViewState::Failed(err) => {
                let body = Column::new()
                    .spacing(spacing::XS)
                    .align_x(alignment::Horizontal::Center)
                    .push(Text::new(i18n.tr("viewer-error-title")).size(typography::BODY))
                    .push(Text::new(failure_reason(err, i18n)).size(typography::CAPTION))
                    .push(
                        button(Text::new(i18n.tr("viewer-retry-button")).size(typography::CAPTION))
                            .padding([spacing::XXS, spacing::SM])
                            .on_press(Message::RetryRequested),
                    );
                Container::new(body)
                    .padding(spacing::MD)
                    .style(styles::container::error_banner)
                    .into()
            }
        };

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center)
            .into()
    }
}

impl Drop for State {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn failure_reason(err: &FetchError, i18n: &I18n) -> String {
    let details = match err {
        FetchError::NotAnImage | FetchError::Status { code: 404, .. } => {
            return i18n.tr(err.i18n_key());
        }
        FetchError::Status { code, text } => format!("{}: {}", code, text),
        FetchError::Transport(details)
        | FetchError::Body(details)
        | FetchError::InvalidUrl(details) => details.clone(),
        FetchError::TooLarge { limit } => format!("{} bytes", limit),
    };
    i18n.tr_with_args(err.i18n_key(), &[("details", details.as_str())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ui::resource_viewer::handle::tests::png_bytes;

    fn i18n() -> I18n {
        I18n::new(Some("en-US".to_string()), &Config::default())
    }

    fn file(id: &str) -> FileReference {
        FileReference::parse(id).expect("valid id")
    }

    fn png_payload() -> Payload {
        Payload::from_bytes(png_bytes()).expect("png payload")
    }

    fn expect_fetch(effect: Effect) -> FetchRequest {
        match effect {
            Effect::Fetch(request) => request,
            Effect::None => panic!("expected a fetch effect"),
        }
    }

    fn loaded_viewer(id: &str, ledger: &HandleLedger) -> State {
        let (mut viewer, effect) = State::mount(Some(file(id)), ledger.clone());
        let request = expect_fetch(effect);
        viewer.handle(Message::Fetched {
            generation: request.generation,
            result: Ok(Some(png_payload())),
        });
        viewer
    }

    #[test]
    fn without_file_shows_not_available_and_fetches_nothing() {
        let (viewer, effect) = State::mount(None, HandleLedger::new());
        assert!(matches!(effect, Effect::None));
        assert!(matches!(viewer.view_state(), ViewState::NoFile));
        assert_eq!(
            viewer.presentation(&i18n()),
            Presentation::NotAvailable {
                message: "Confusion matrix is not available.".to_string()
            }
        );
    }

    #[test]
    fn with_file_shows_retrieving_before_completion() {
        let (viewer, effect) = State::mount(Some(file("abc123")), HandleLedger::new());
        let request = expect_fetch(effect);
        assert_eq!(request.file.id.as_str(), "abc123");
        assert_eq!(
            viewer.presentation(&i18n()),
            Presentation::Retrieving {
                caption: "Retrieving confusion matrix...".to_string()
            }
        );
    }

    #[test]
    fn successful_fetch_shows_titled_card() {
        let ledger = HandleLedger::new();
        let viewer = loaded_viewer("abc123", &ledger);

        let handle = viewer.view_state().handle().expect("loaded");
        assert_eq!(handle.byte_len(), png_bytes().len());
        assert_eq!(
            viewer.presentation(&i18n()),
            Presentation::Card {
                title: "Confusion Matrix".to_string(),
                handle: handle.id(),
            }
        );
        assert_eq!(ledger.live(), 1);
    }

    #[test]
    fn drawing_loaded_card_borrows_the_live_handle() {
        let ledger = HandleLedger::new();
        let viewer = loaded_viewer("abc123", &ledger);
        let before = viewer.view_state().handle().map(|handle| handle.id());
        let i18n = i18n();

        {
            let _first: Element<'_, Message> = viewer.view(&i18n);
            let _second: Element<'_, Message> = viewer.view(&i18n);
        }

        assert_eq!(viewer.view_state().handle().map(|handle| handle.id()), before);
        assert_eq!(ledger.live(), 1);
    }

    #[test]
    fn every_state_can_be_drawn() {
        let i18n = i18n();
        let ledger = HandleLedger::new();

        let (mut viewer, effect) = State::mount(None, ledger.clone());
        assert!(matches!(effect, Effect::None));
        let _ = viewer.view(&i18n);

        let request = expect_fetch(viewer.handle(Message::FileChanged(Some(file("abc123")))));
        let _ = viewer.view(&i18n);

        viewer.handle(Message::Fetched {
            generation: request.generation,
            result: Err(FetchError::NotAnImage),
        });
        let _ = viewer.view(&i18n);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn error_status_moves_to_failed() {
        let (mut viewer, effect) = State::mount(Some(file("abc123")), HandleLedger::new());
        let request = expect_fetch(effect);
        viewer.handle(Message::Fetched {
            generation: request.generation,
            result: Err(FetchError::Status {
                code: 404,
                text: "Not Found".to_string(),
            }),
        });

        assert_eq!(
            viewer.view_state().error(),
            Some(&FetchError::Status {
                code: 404,
                text: "Not Found".to_string()
            })
        );
        match viewer.presentation(&i18n()) {
            Presentation::Failed { reason, .. } => {
                assert_eq!(reason, "The server has no file with this identifier.")
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn server_error_reason_includes_status() {
        let (mut viewer, effect) = State::mount(Some(file("abc123")), HandleLedger::new());
        let request = expect_fetch(effect);
        viewer.handle(Message::Fetched {
            generation: request.generation,
            result: Err(FetchError::Status {
                code: 503,
                text: "Service Unavailable".to_string(),
            }),
        });
        match viewer.presentation(&i18n()) {
            Presentation::Failed { reason, .. } => {
                assert!(reason.contains("503: Service Unavailable"))
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn rendering_is_idempotent_before_completion() {
        let i18n = i18n();
        let (viewer, _effect) = State::mount(Some(file("abc123")), HandleLedger::new());
        assert_eq!(viewer.presentation(&i18n), viewer.presentation(&i18n));
    }

    #[test]
    fn same_file_id_does_not_refetch() {
        let (mut viewer, effect) = State::mount(Some(file("abc123")), HandleLedger::new());
        expect_fetch(effect);
        assert!(matches!(
            viewer.handle(Message::FileChanged(Some(file("abc123")))),
            Effect::None
        ));
        assert!(viewer.is_loading());
    }

    #[test]
    fn new_file_id_reloads_and_releases_previous_handle() {
        let ledger = HandleLedger::new();
        let mut viewer = loaded_viewer("abc123", &ledger);
        assert_eq!(ledger.live(), 1);

        let request = expect_fetch(viewer.handle(Message::FileChanged(Some(file("def456")))));
        assert_eq!(request.file.id.as_str(), "def456");
        assert!(viewer.is_loading());
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn stale_result_is_discarded() {
        let ledger = HandleLedger::new();
        let (mut viewer, effect) = State::mount(Some(file("abc123")), ledger.clone());
        let first = expect_fetch(effect);
        let second = expect_fetch(viewer.handle(Message::FileChanged(Some(file("def456")))));

        assert!(files::is_cancelled(&first.token));
        assert!(!files::is_cancelled(&second.token));

        viewer.handle(Message::Fetched {
            generation: first.generation,
            result: Ok(Some(png_payload())),
        });
        assert!(viewer.is_loading());
        assert_eq!(ledger.live(), 0);

        viewer.handle(Message::Fetched {
            generation: second.generation,
            result: Ok(Some(png_payload())),
        });
        assert!(viewer.view_state().handle().is_some());
        assert_eq!(ledger.live(), 1);
    }

    #[test]
    fn clearing_file_returns_to_not_available() {
        let ledger = HandleLedger::new();
        let mut viewer = loaded_viewer("abc123", &ledger);
        assert!(matches!(
            viewer.handle(Message::FileChanged(None)),
            Effect::None
        ));
        assert!(matches!(viewer.view_state(), ViewState::NoFile));
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn result_after_teardown_is_ignored() {
        let ledger = HandleLedger::new();
        let (mut viewer, effect) = State::mount(Some(file("abc123")), ledger.clone());
        let request = expect_fetch(effect);

        viewer.teardown();
        assert!(files::is_cancelled(&request.token));

        viewer.handle(Message::Fetched {
            generation: request.generation,
            result: Ok(Some(png_payload())),
        });
        assert!(matches!(viewer.view_state(), ViewState::NoFile));
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn dropping_viewer_releases_handle() {
        let ledger = HandleLedger::new();
        let viewer = loaded_viewer("abc123", &ledger);
        assert_eq!(ledger.live(), 1);
        drop(viewer);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let ledger = HandleLedger::new();
        let (mut viewer, effect) = State::mount(Some(file("abc123")), ledger.clone());
        let request = expect_fetch(effect);
        for _ in 0..2 {
            viewer.handle(Message::Fetched {
                generation: request.generation,
                result: Ok(Some(png_payload())),
            });
        }
        assert_eq!(ledger.live(), 1);
    }

    #[test]
    fn retry_only_applies_after_failure() {
        let (mut viewer, effect) = State::mount(Some(file("abc123")), HandleLedger::new());
        let request = expect_fetch(effect);
        assert!(matches!(
            viewer.handle(Message::RetryRequested),
            Effect::None
        ));

        viewer.handle(Message::Fetched {
            generation: request.generation,
            result: Err(FetchError::Transport("connection refused".to_string())),
        });
        let retry = expect_fetch(viewer.handle(Message::RetryRequested));
        assert_eq!(retry.file.id.as_str(), "abc123");
        assert!(retry.generation > request.generation);
        assert!(viewer.is_loading());
    }

    #[test]
    fn spinner_only_turns_while_loading() {
        let ledger = HandleLedger::new();
        let (mut loading, _effect) = State::mount(Some(file("abc123")), ledger.clone());
        loading.handle(Message::SpinnerTick);
        assert!(loading.spinner_rotation > 0.0);

        let mut idle = State::new(ledger);
        idle.handle(Message::SpinnerTick);
        assert_eq!(idle.spinner_rotation, 0.0);
    }
}
