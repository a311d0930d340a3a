//! Headless view binding: every element the upload workflow touches, bound
//! once at start-up and mutated only through the methods below.

use std::time::Instant;

use shared::domain::{ClassificationResult, Screen};

use crate::{
    history::HistoryTable,
    notifications::{ToastKind, ToastQueue},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Auto,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenElement {
    pub screen: Screen,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultModal {
    pub visible: bool,
    pub image_src: Option<String>,
    pub status_text: String,
    pub confidence_text: String,
    pub status_icon: Option<&'static str>,
    pub description: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthControls {
    pub login_visible: bool,
    pub register_visible: bool,
    pub profile_link_visible: bool,
    pub logout_visible: bool,
    pub nav_history_visible: bool,
}

#[derive(Debug)]
pub struct ViewBinding {
    pub screens: Vec<ScreenElement>,
    pub modal: ResultModal,
    pub about_visible: bool,
    pub history_visible: bool,
    pub history: HistoryTable,
    pub body_overflow: Overflow,
    pub auth: AuthControls,
    pub scroll_target: Option<Section>,
    pub toasts: ToastQueue,
    alerts: Vec<String>,
}

impl Default for ViewBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBinding {
    pub fn new() -> Self {
        Self {
            screens: Screen::ALL
                .into_iter()
                .map(|screen| ScreenElement {
                    screen,
                    active: false,
                })
                .collect(),
            modal: ResultModal::default(),
            about_visible: false,
            history_visible: false,
            history: HistoryTable::Idle,
            body_overflow: Overflow::Auto,
            auth: AuthControls::default(),
            scroll_target: None,
            toasts: ToastQueue::default(),
            alerts: Vec::new(),
        }
    }

    /// Activates exactly one screen. The about panel follows the home screen;
    /// the history panel additionally requires a logged-in session.
    pub fn show_screen(&mut self, screen: Screen, logged_in: bool) {
        for element in &mut self.screens {
            element.active = element.screen == screen;
        }
        self.about_visible = screen == Screen::Home;
        self.history_visible = screen == Screen::Home && logged_in;
    }

    pub fn active_screens(&self) -> impl Iterator<Item = Screen> + '_ {
        self.screens.iter().filter(|e| e.active).map(|e| e.screen)
    }

    pub fn active_screen(&self) -> Option<Screen> {
        self.active_screens().next()
    }

    pub fn show_result_modal(&mut self, result: &ClassificationResult, image_url: String) {
        let verdict = result.verdict();
        self.modal = ResultModal {
            visible: true,
            image_src: Some(image_url),
            status_text: result.label.clone(),
            confidence_text: format!("Accuracy: {}", result.confidence_percent()),
            status_icon: Some(verdict.icon()),
            description: Some(verdict.description()),
        };
        self.body_overflow = Overflow::Hidden;
    }

    /// Safe to call repeatedly; a hidden modal stays hidden.
    pub fn hide_modal(&mut self) {
        self.modal.visible = false;
        self.body_overflow = Overflow::Auto;
        self.about_visible = true;
    }

    pub fn modal_visible(&self) -> bool {
        self.modal.visible
    }

    pub fn apply_auth(&mut self, logged_in: bool) {
        self.auth = AuthControls {
            login_visible: !logged_in,
            register_visible: !logged_in,
            profile_link_visible: logged_in,
            logout_visible: logged_in,
            nav_history_visible: logged_in,
        };
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn toast(&mut self, message: impl Into<String>, kind: ToastKind) -> u64 {
        self.toasts.push(message, kind, Instant::now())
    }
}
