//! Application state owned by the upload coordinator.

use serde::Deserialize;
use shared::domain::{ClassificationResult, Screen};

/// Session facts the page embeds for the client at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionContext {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub user_name: String,
    /// `(category, message)` pairs queued by the server for display.
    #[serde(default)]
    pub flash_messages: Vec<(Option<String>, String)>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user_name: impl Into<String>) -> Self {
        Self {
            logged_in: true,
            user_name: user_name.into(),
            flash_messages: Vec::new(),
        }
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    session: SessionContext,
    screen: Screen,
    last_result: Option<ClassificationResult>,
    uploads_started: u64,
}

impl AppState {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            screen: Screen::Home,
            last_result: None,
            uploads_started: 0,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.logged_in
    }

    pub fn user_name(&self) -> &str {
        &self.session.user_name
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn last_result(&self) -> Option<&ClassificationResult> {
        self.last_result.as_ref()
    }

    pub fn uploads_started(&self) -> u64 {
        self.uploads_started
    }

    pub(crate) fn set_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub(crate) fn record_result(&mut self, result: ClassificationResult) {
        self.last_result = Some(result);
    }

    pub(crate) fn record_upload_started(&mut self) {
        self.uploads_started += 1;
    }

    pub(crate) fn take_flash_messages(&mut self) -> Vec<(Option<String>, String)> {
        std::mem::take(&mut self.session.flash_messages)
    }
}
