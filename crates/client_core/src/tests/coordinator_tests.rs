use super::*;
use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use shared::{domain::HEALTHY_ICON, protocol::HistoryEntry};

use crate::{
    error::ClientError,
    events::{ClickTarget, Key},
    view::Overflow,
};

enum UploadReply {
    Ok(ClassificationResult),
    ServerError(String),
    Status(u16),
    Malformed,
}

#[derive(Default)]
struct ScriptedApi {
    uploads: Mutex<VecDeque<UploadReply>>,
    histories: Mutex<VecDeque<Result<Vec<HistoryEntry>, String>>>,
    upload_calls: Mutex<Vec<String>>,
    history_calls: Mutex<u32>,
}

impl ScriptedApi {
    fn with_upload(self, reply: UploadReply) -> Self {
        self.uploads.lock().expect("uploads").push_back(reply);
        self
    }

    fn with_history(self, reply: Result<Vec<HistoryEntry>, String>) -> Self {
        self.histories.lock().expect("histories").push_back(reply);
        self
    }

    fn upload_calls(&self) -> Vec<String> {
        self.upload_calls.lock().expect("calls").clone()
    }

    fn history_calls(&self) -> u32 {
        *self.history_calls.lock().expect("calls")
    }
}

#[async_trait]
impl DetectionApi for ScriptedApi {
    async fn upload(&self, image: &PickedImage) -> Result<ClassificationResult, ClientError> {
        self.upload_calls
            .lock()
            .expect("calls")
            .push(image.filename().to_string());
        let reply = self.uploads.lock().expect("uploads").pop_front();
        match reply {
            Some(UploadReply::Ok(result)) => Ok(result),
            Some(UploadReply::ServerError(msg)) => Err(ClientError::Server(msg)),
            Some(UploadReply::Status(status)) => Err(ClientError::Status { status }),
            Some(UploadReply::Malformed) | None => {
                Err(ClientError::Malformed("expected value at line 1".to_string()))
            }
        }
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        *self.history_calls.lock().expect("calls") += 1;
        let reply = self.histories.lock().expect("histories").pop_front();
        reply
            .unwrap_or_else(|| Ok(Vec::new()))
            .map_err(ClientError::Server)
    }
}

struct ScriptedPicker {
    paths: VecDeque<Option<PathBuf>>,
    accepts_seen: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FilePicker for ScriptedPicker {
    fn pick(&mut self, accept: &[&str]) -> Option<PathBuf> {
        self.accepts_seen
            .lock()
            .expect("accepts")
            .push(accept.iter().map(|s| s.to_string()).collect());
        self.paths.pop_front().flatten()
    }
}

fn picker(paths: Vec<Option<PathBuf>>) -> (Box<dyn FilePicker>, Arc<Mutex<Vec<Vec<String>>>>) {
    let accepts_seen = Arc::new(Mutex::new(Vec::new()));
    let picker = ScriptedPicker {
        paths: paths.into(),
        accepts_seen: accepts_seen.clone(),
    };
    (Box::new(picker), accepts_seen)
}

fn coordinator(api: Arc<ScriptedApi>, session: SessionContext) -> UploadCoordinator {
    let (picker, _) = picker(Vec::new());
    let mut coordinator = UploadCoordinator::new(api, picker, session);
    coordinator.start();
    coordinator
}

fn leaf() -> PickedImage {
    PickedImage::new("leaf.jpg", b"jpeg-bytes".to_vec())
}

fn history_entry(result: &str) -> HistoryEntry {
    HistoryEntry {
        detection_date: "2024-06-02T10:00:00".to_string(),
        result: result.to_string(),
        confidence: Some(0.9),
        raw_image_url: Some("/uploads/raw_images/a.png".to_string()),
    }
}

fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("fusacheck_coordinator_test_{suffix}"));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write temp file");
    path
}

fn assert_single_active(coordinator: &UploadCoordinator, expected: Screen) {
    let active: Vec<_> = coordinator.view().active_screens().collect();
    assert_eq!(active, vec![expected]);
    assert_eq!(coordinator.state().screen(), expected);
}

#[tokio::test]
async fn successful_upload_lands_on_home_with_modal() {
    let api = Arc::new(
        ScriptedApi::default().with_upload(UploadReply::Ok(ClassificationResult::new(
            "Healthy", 0.8734,
        ))),
    );
    let mut coordinator = coordinator(api.clone(), SessionContext::anonymous());

    coordinator.submit(leaf()).await;

    assert_single_active(&coordinator, Screen::Home);
    let view = coordinator.view();
    assert!(view.modal_visible());
    assert_eq!(view.body_overflow, Overflow::Hidden);
    assert_eq!(view.modal.status_icon, Some(HEALTHY_ICON));
    assert!(view.modal.confidence_text.contains("87.34%"));
    assert_eq!(
        view.modal.image_src.as_deref(),
        Some(leaf().object_url().as_str())
    );
    assert!(view.alerts().is_empty());
    assert_eq!(api.upload_calls(), vec!["leaf.jpg".to_string()]);
    assert_eq!(api.history_calls(), 0);
}

#[tokio::test]
async fn failed_uploads_always_return_home_without_modal() {
    let replies = [
        UploadReply::ServerError("Failed to save uploaded file".to_string()),
        UploadReply::Status(502),
        UploadReply::Malformed,
    ];
    for reply in replies {
        let api = Arc::new(ScriptedApi::default().with_upload(reply));
        let mut coordinator = coordinator(api, SessionContext::anonymous());

        coordinator.submit(leaf()).await;

        assert_single_active(&coordinator, Screen::Home);
        assert!(!coordinator.view().modal_visible());
        let alerts = coordinator.view_mut().take_alerts();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].starts_with("An error occurred: "), "{}", alerts[0]);
    }
}

#[tokio::test]
async fn server_error_text_reaches_the_alert() {
    let api = Arc::new(
        ScriptedApi::default().with_upload(UploadReply::ServerError("No selected file".into())),
    );
    let mut coordinator = coordinator(api, SessionContext::anonymous());
    coordinator.submit(leaf()).await;
    assert_eq!(
        coordinator.view().alerts(),
        ["An error occurred: No selected file".to_string()]
    );
}

#[tokio::test]
async fn empty_drop_makes_no_transition_and_no_request() {
    let api = Arc::new(ScriptedApi::default());
    let mut coordinator = coordinator(api.clone(), SessionContext::anonymous());

    let dispatched = coordinator.drop_files(Vec::new()).await;

    assert!(dispatched.default_prevented);
    assert_single_active(&coordinator, Screen::Home);
    assert!(api.upload_calls().is_empty());
    assert_eq!(coordinator.state().uploads_started(), 0);
}

#[tokio::test]
async fn drag_over_and_drop_suppress_default_navigation() {
    let api = Arc::new(
        ScriptedApi::default().with_upload(UploadReply::Ok(ClassificationResult::new(
            "Fusarium Wilt",
            0.66,
        ))),
    );
    let mut coordinator = coordinator(api.clone(), SessionContext::anonymous());

    assert!(coordinator.dispatch(UiEvent::DragOver).await.default_prevented);
    let dispatched = coordinator.drop_files(vec![leaf()]).await;

    assert!(dispatched.default_prevented);
    assert_eq!(api.upload_calls(), vec!["leaf.jpg".to_string()]);
    assert!(coordinator.view().modal_visible());
    assert_eq!(coordinator.view().modal.status_text, "Fusarium Wilt");
}

#[tokio::test]
async fn file_picker_feeds_submit() {
    let path = temp_file("picked.png", b"png-bytes");
    let api = Arc::new(
        ScriptedApi::default().with_upload(UploadReply::Ok(ClassificationResult::new(
            "Healthy", 0.9,
        ))),
    );
    let (picker, accepts_seen) = picker(vec![Some(path.clone())]);
    let mut coordinator = UploadCoordinator::new(api.clone(), picker, SessionContext::anonymous());
    coordinator.start();

    coordinator.select_file().await;

    assert_eq!(api.upload_calls(), vec!["picked.png".to_string()]);
    assert_eq!(
        accepts_seen.lock().expect("accepts")[0],
        vec!["image/png", "image/jpeg", "image/jpg"]
    );
    assert!(coordinator.view().modal_visible());

    std::fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[tokio::test]
async fn cancelled_or_rejected_pick_does_not_upload() {
    let gif = temp_file("picked.gif", b"GIF89a");
    let api = Arc::new(ScriptedApi::default());
    let (picker, _) = picker(vec![None, Some(gif.clone())]);
    let mut coordinator = UploadCoordinator::new(api.clone(), picker, SessionContext::anonymous());
    coordinator.start();

    coordinator.select_file().await;
    assert!(coordinator.view().alerts().is_empty());

    coordinator.select_file().await;
    assert_eq!(coordinator.view().alerts().len(), 1);

    assert!(api.upload_calls().is_empty());
    assert_single_active(&coordinator, Screen::Home);

    std::fs::remove_dir_all(gif.parent().expect("parent")).expect("cleanup");
}

#[tokio::test]
async fn hide_modal_twice_matches_hiding_once() {
    let api = Arc::new(
        ScriptedApi::default().with_upload(UploadReply::Ok(ClassificationResult::new(
            "Healthy", 0.5,
        ))),
    );
    let mut coordinator = coordinator(api, SessionContext::anonymous());
    coordinator.submit(leaf()).await;

    coordinator.hide_modal();
    let once = (
        coordinator.view().modal.clone(),
        coordinator.view().body_overflow,
        coordinator.view().about_visible,
        coordinator.state().screen(),
    );
    coordinator.hide_modal();
    let twice = (
        coordinator.view().modal.clone(),
        coordinator.view().body_overflow,
        coordinator.view().about_visible,
        coordinator.state().screen(),
    );

    assert_eq!(once, twice);
    assert_eq!(twice.1, Overflow::Auto);
    assert!(twice.2);
}

#[tokio::test]
async fn backdrop_and_escape_close_through_dispatch() {
    let api = Arc::new(
        ScriptedApi::default()
            .with_upload(UploadReply::Ok(ClassificationResult::new("Healthy", 0.5)))
            .with_upload(UploadReply::Ok(ClassificationResult::new("Healthy", 0.6))),
    );
    let mut coordinator = coordinator(api, SessionContext::anonymous());

    coordinator.submit(leaf()).await;
    coordinator
        .dispatch(UiEvent::ModalClicked(ClickTarget::Content))
        .await;
    assert!(coordinator.view().modal_visible());
    coordinator
        .dispatch(UiEvent::ModalClicked(ClickTarget::Backdrop))
        .await;
    assert!(!coordinator.view().modal_visible());

    coordinator.submit(leaf()).await;
    coordinator.dispatch(UiEvent::KeyDown(Key::Escape)).await;
    assert!(!coordinator.view().modal_visible());
    assert_single_active(&coordinator, Screen::Home);
}

#[tokio::test]
async fn logged_in_start_loads_history_and_shows_panel() {
    let api = Arc::new(ScriptedApi::default().with_history(Ok(vec![history_entry("Healthy")])));
    let mut coordinator = coordinator(api.clone(), SessionContext::logged_in("sari"));

    assert_eq!(coordinator.view().history, HistoryTable::Loading);
    assert!(coordinator.view().history_visible);
    assert!(coordinator.view().auth.logout_visible);

    coordinator.settle().await;

    assert_eq!(api.history_calls(), 1);
    assert_eq!(coordinator.view().history.rows().len(), 1);
    assert_eq!(coordinator.view().history.rows()[0].date, "02/06/2024");
    assert_eq!(coordinator.background_pending(), 0);
}

#[tokio::test]
async fn successful_upload_refreshes_history_when_logged_in() {
    let api = Arc::new(
        ScriptedApi::default()
            .with_history(Ok(Vec::new()))
            .with_history(Ok(vec![history_entry("Healthy")]))
            .with_upload(UploadReply::Ok(ClassificationResult::new("Healthy", 0.7))),
    );
    let mut coordinator = coordinator(api.clone(), SessionContext::logged_in("sari"));
    coordinator.settle().await;
    assert_eq!(coordinator.view().history, HistoryTable::Empty);

    coordinator.submit(leaf()).await;
    assert!(coordinator.view().modal_visible());
    coordinator.settle().await;

    assert_eq!(api.history_calls(), 2);
    assert_eq!(coordinator.view().history.rows().len(), 1);
}

#[tokio::test]
async fn history_failure_does_not_disturb_the_result() {
    let api = Arc::new(
        ScriptedApi::default()
            .with_history(Ok(Vec::new()))
            .with_history(Err("database offline".to_string()))
            .with_upload(UploadReply::Ok(ClassificationResult::new("Healthy", 0.7))),
    );
    let mut coordinator = coordinator(api, SessionContext::logged_in("sari"));
    coordinator.settle().await;

    coordinator.submit(leaf()).await;
    coordinator.settle().await;

    assert_eq!(coordinator.view().history, HistoryTable::Failed);
    assert!(coordinator.view().modal_visible());
    assert!(coordinator.view().alerts().is_empty());
    assert_single_active(&coordinator, Screen::Home);
}

#[tokio::test]
async fn anonymous_session_never_fetches_history() {
    let api = Arc::new(ScriptedApi::default());
    let mut coordinator = coordinator(api.clone(), SessionContext::anonymous());
    coordinator.settle().await;
    assert_eq!(coordinator.pump().await, 0);

    assert_eq!(api.history_calls(), 0);
    assert!(!coordinator.view().history_visible);
    assert!(coordinator.view().auth.login_visible);
}

#[tokio::test]
async fn flash_messages_become_toasts() {
    let api = Arc::new(ScriptedApi::default());
    let session = SessionContext {
        logged_in: false,
        user_name: String::new(),
        flash_messages: vec![
            (Some("danger".to_string()), "Wrong password".to_string()),
            (Some("success".to_string()), "Registered".to_string()),
        ],
    };
    let coordinator = coordinator(api, session);

    assert_eq!(coordinator.view().toasts.len(), 2);
    assert!(coordinator.state().session().flash_messages.is_empty());
}

#[tokio::test]
async fn show_screen_keeps_exactly_one_active() {
    let api = Arc::new(ScriptedApi::default());
    let mut coordinator = coordinator(api, SessionContext::logged_in("sari"));
    for screen in [Screen::Loading, Screen::Home, Screen::Loading, Screen::Home] {
        coordinator.show_screen(screen);
        assert_single_active(&coordinator, screen);
    }
    coordinator.settle().await;
}
