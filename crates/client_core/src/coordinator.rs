//! Upload coordinator: owns the application state and view binding, runs
//! reducer effects, and feeds I/O completions back in as events.

use std::{collections::VecDeque, sync::Arc};

use shared::domain::{ClassificationResult, Screen};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    events::{self, Effect, UiEvent},
    history::HistoryTable,
    image::PickedImage,
    notifications::ToastKind,
    state::{AppState, SessionContext},
    view::ViewBinding,
    DetectionApi, FilePicker,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    /// The originating browser-style event must not run its default action.
    pub default_prevented: bool,
}

pub struct UploadCoordinator {
    api: Arc<dyn DetectionApi>,
    picker: Box<dyn FilePicker>,
    state: AppState,
    view: ViewBinding,
    background_tx: mpsc::UnboundedSender<UiEvent>,
    background_rx: mpsc::UnboundedReceiver<UiEvent>,
    background_pending: usize,
}

impl UploadCoordinator {
    pub fn new(
        api: Arc<dyn DetectionApi>,
        picker: Box<dyn FilePicker>,
        session: SessionContext,
    ) -> Self {
        let (background_tx, background_rx) = mpsc::unbounded_channel();
        Self {
            api,
            picker,
            state: AppState::new(session),
            view: ViewBinding::new(),
            background_tx,
            background_rx,
            background_pending: 0,
        }
    }

    /// Initial render. Must run inside a tokio runtime when the session is
    /// logged in, since that kicks off a history refresh.
    pub fn start(&mut self) {
        let logged_in = self.state.is_logged_in();
        self.view.apply_auth(logged_in);
        for (category, message) in self.state.take_flash_messages() {
            self.view
                .toast(message, ToastKind::from_category(category.as_deref()));
        }
        if logged_in {
            self.spawn_history_refresh();
        }
        events::show_screen(&mut self.state, &mut self.view, Screen::Home);
        info!(
            logged_in,
            user = self.state.user_name(),
            "upload coordinator started"
        );
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> &ViewBinding {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewBinding {
        &mut self.view
    }

    /// Number of history refreshes whose results have not been applied yet.
    pub fn background_pending(&self) -> usize {
        self.background_pending
    }

    pub async fn dispatch(&mut self, event: UiEvent) -> Dispatched {
        let mut outcome = Dispatched::default();
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            for effect in events::reduce(&mut self.state, &mut self.view, event) {
                match effect {
                    Effect::PreventDefault => outcome.default_prevented = true,
                    Effect::OpenFilePicker { accept } => {
                        let picked = self.pick_file(accept).await;
                        queue.push_back(UiEvent::FilePicked(picked));
                    }
                    Effect::SubmitUpload(image) => {
                        queue.push_back(self.upload(image).await);
                    }
                    Effect::RefreshHistory => self.spawn_history_refresh(),
                }
            }
        }
        outcome
    }

    pub async fn select_file(&mut self) -> Dispatched {
        self.dispatch(UiEvent::UploadClicked).await
    }

    pub async fn drop_files(&mut self, files: Vec<PickedImage>) -> Dispatched {
        self.dispatch(UiEvent::Dropped(files)).await
    }

    pub async fn submit(&mut self, image: PickedImage) -> Dispatched {
        self.dispatch(UiEvent::FilePicked(Some(image))).await
    }

    pub fn show_result_modal(&mut self, result: ClassificationResult, image_url: String) {
        self.view.show_result_modal(&result, image_url);
    }

    pub fn hide_modal(&mut self) {
        events::close_modal(&mut self.state, &mut self.view);
    }

    pub fn show_screen(&mut self, screen: Screen) {
        events::show_screen(&mut self.state, &mut self.view, screen);
    }

    /// Applies background completions that have already arrived.
    pub async fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.background_rx.try_recv() {
            self.background_pending = self.background_pending.saturating_sub(1);
            self.dispatch(event).await;
            applied += 1;
        }
        applied
    }

    /// Waits for every outstanding background task and applies its result.
    pub async fn settle(&mut self) {
        while self.background_pending > 0 {
            let Some(event) = self.background_rx.recv().await else {
                break;
            };
            self.background_pending -= 1;
            self.dispatch(event).await;
        }
    }

    async fn pick_file(&mut self, accept: &[&str]) -> Option<PickedImage> {
        let path = self.picker.pick(accept)?;
        match PickedImage::load_accepted(&path).await {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "picked file rejected");
                self.view.alert(err.user_message());
                None
            }
        }
    }

    async fn upload(&self, image: PickedImage) -> UiEvent {
        debug!(filename = image.filename(), "submitting upload");
        match self.api.upload(&image).await {
            Ok(result) => UiEvent::UploadSucceeded { image, result },
            Err(err) => {
                error!(
                    filename = image.filename(),
                    kind = ?err.kind(),
                    error = %err,
                    "upload failed"
                );
                UiEvent::UploadFailed {
                    message: err.user_message(),
                }
            }
        }
    }

    fn spawn_history_refresh(&mut self) {
        self.view.history = HistoryTable::Loading;
        self.background_pending += 1;
        let api = Arc::clone(&self.api);
        let tx = self.background_tx.clone();
        tokio::spawn(async move {
            let event = match api.history().await {
                Ok(entries) => UiEvent::HistoryLoaded(entries),
                Err(err) => UiEvent::HistoryFailed(err.to_string()),
            };
            let _ = tx.send(event);
        });
    }
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
