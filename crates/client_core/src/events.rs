//! UI events, effects, and the reducer that maps one onto the other.

use shared::{
    domain::{ClassificationResult, Screen},
    protocol::HistoryEntry,
};
use tracing::{debug, warn};

use crate::{
    history::HistoryTable,
    image::{PickedImage, ACCEPTED_MIME_TYPES},
    state::AppState,
    view::{Section, ViewBinding},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    UploadClicked,
    FilePicked(Option<PickedImage>),
    DragOver,
    Dropped(Vec<PickedImage>),
    UploadSucceeded {
        image: PickedImage,
        result: ClassificationResult,
    },
    UploadFailed {
        message: String,
    },
    HistoryLoaded(Vec<HistoryEntry>),
    HistoryFailed(String),
    CloseIconClicked,
    CloseButtonClicked,
    TryAgainClicked,
    ModalClicked(ClickTarget),
    KeyDown(Key),
    BackClicked,
    ShowHistoryClicked,
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::UploadClicked => "upload_clicked",
            UiEvent::FilePicked(_) => "file_picked",
            UiEvent::DragOver => "drag_over",
            UiEvent::Dropped(_) => "dropped",
            UiEvent::UploadSucceeded { .. } => "upload_succeeded",
            UiEvent::UploadFailed { .. } => "upload_failed",
            UiEvent::HistoryLoaded(_) => "history_loaded",
            UiEvent::HistoryFailed(_) => "history_failed",
            UiEvent::CloseIconClicked => "close_icon_clicked",
            UiEvent::CloseButtonClicked => "close_button_clicked",
            UiEvent::TryAgainClicked => "try_again_clicked",
            UiEvent::ModalClicked(_) => "modal_clicked",
            UiEvent::KeyDown(_) => "key_down",
            UiEvent::BackClicked => "back_clicked",
            UiEvent::ShowHistoryClicked => "show_history_clicked",
        }
    }
}

/// I/O the coordinator performs on the reducer's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PreventDefault,
    OpenFilePicker { accept: &'static [&'static str] },
    SubmitUpload(PickedImage),
    RefreshHistory,
}

/// The only place the active screen changes.
pub fn show_screen(state: &mut AppState, view: &mut ViewBinding, screen: Screen) {
    state.set_screen(screen);
    view.show_screen(screen, state.is_logged_in());
}

/// Shared by every modal close trigger.
pub fn close_modal(state: &mut AppState, view: &mut ViewBinding) {
    view.hide_modal();
    show_screen(state, view, Screen::Home);
}

fn begin_submit(state: &mut AppState, view: &mut ViewBinding, image: PickedImage) -> Vec<Effect> {
    state.record_upload_started();
    view.hide_modal();
    show_screen(state, view, Screen::Loading);
    vec![Effect::SubmitUpload(image)]
}

pub fn reduce(state: &mut AppState, view: &mut ViewBinding, event: UiEvent) -> Vec<Effect> {
    debug!(event = event.name(), screen = %state.screen(), "reducing ui event");
    match event {
        UiEvent::UploadClicked => vec![Effect::OpenFilePicker {
            accept: ACCEPTED_MIME_TYPES,
        }],
        UiEvent::FilePicked(None) => Vec::new(),
        UiEvent::FilePicked(Some(image)) => begin_submit(state, view, image),
        UiEvent::DragOver => vec![Effect::PreventDefault],
        UiEvent::Dropped(files) => {
            let mut effects = vec![Effect::PreventDefault];
            if let Some(image) = files.into_iter().next() {
                effects.extend(begin_submit(state, view, image));
            }
            effects
        }
        UiEvent::UploadSucceeded { image, result } => {
            show_screen(state, view, Screen::Home);
            view.show_result_modal(&result, image.object_url());
            state.record_result(result);
            if state.is_logged_in() {
                vec![Effect::RefreshHistory]
            } else {
                Vec::new()
            }
        }
        UiEvent::UploadFailed { message } => {
            view.alert(message);
            show_screen(state, view, Screen::Home);
            Vec::new()
        }
        UiEvent::HistoryLoaded(entries) => {
            view.history = HistoryTable::from_entries(&entries);
            Vec::new()
        }
        UiEvent::HistoryFailed(reason) => {
            warn!(%reason, "history refresh failed");
            view.history = HistoryTable::Failed;
            Vec::new()
        }
        UiEvent::CloseIconClicked | UiEvent::CloseButtonClicked | UiEvent::TryAgainClicked => {
            close_modal(state, view);
            Vec::new()
        }
        UiEvent::ModalClicked(ClickTarget::Backdrop) => {
            close_modal(state, view);
            Vec::new()
        }
        UiEvent::ModalClicked(ClickTarget::Content) => Vec::new(),
        UiEvent::KeyDown(Key::Escape) if view.modal_visible() => {
            close_modal(state, view);
            Vec::new()
        }
        UiEvent::KeyDown(_) => Vec::new(),
        UiEvent::BackClicked => {
            show_screen(state, view, Screen::Home);
            Vec::new()
        }
        UiEvent::ShowHistoryClicked => {
            show_screen(state, view, Screen::Home);
            view.scroll_target = Some(Section::History);
            vec![Effect::PreventDefault]
        }
    }
}
