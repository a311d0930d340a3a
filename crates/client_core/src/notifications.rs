//! Transient, auto-dismissing toast notifications.

use std::time::{Duration, Instant};

pub const TOAST_TIMEOUT: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    /// Maps a flash-message category. Both `danger` and `error` are errors.
    pub fn from_category(category: Option<&str>) -> Self {
        let Some(category) = category else {
            return ToastKind::Success;
        };
        match category.trim().to_ascii_lowercase().as_str() {
            "success" => ToastKind::Success,
            "danger" | "error" => ToastKind::Error,
            "warning" => ToastKind::Warning,
            _ => ToastKind::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    remaining: Duration,
    running_since: Option<Instant>,
}

impl Toast {
    fn remaining_at(&self, now: Instant) -> Duration {
        match self.running_since {
            Some(since) => self
                .remaining
                .saturating_sub(now.saturating_duration_since(since)),
            None => self.remaining,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.running_since.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.toasts.push(Toast {
            id,
            message: message.into(),
            kind,
            remaining: TOAST_TIMEOUT,
            running_since: Some(now),
        });
        id
    }

    /// Hovering a toast stops its timer.
    pub fn pause(&mut self, id: u64, now: Instant) {
        if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) {
            toast.remaining = toast.remaining_at(now);
            toast.running_since = None;
        }
    }

    pub fn resume(&mut self, id: u64, now: Instant) {
        if let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) {
            if toast.running_since.is_none() {
                toast.running_since = Some(now);
            }
        }
    }

    /// Drops expired toasts and returns the ones still on screen.
    pub fn visible(&mut self, now: Instant) -> &[Toast] {
        self.toasts.retain(|t| !t.remaining_at(now).is_zero());
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
