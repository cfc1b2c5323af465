use log::debug;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub title: Option<String>,
    pub message: String,
    /// How many identical toasts were folded into this one
    pub repeats: u32,
    pub expires_at: Instant,
}

/// Transient user-facing messages
///
/// Toasts auto-dismiss after a fixed duration unless dismissed sooner. An
/// identical toast that is still visible absorbs a new one (its counter goes
/// up and its timer restarts), and beyond `capacity` the oldest is dropped,
/// so a failure storm cannot grow the container without bound.
pub struct ToastService {
    clock: Arc<dyn Clock>,
    duration: Duration,
    capacity: usize,
    toasts: VecDeque<Toast>,
}

impl ToastService {
    pub fn new(clock: Arc<dyn Clock>, duration: Duration, capacity: usize) -> Self {
        ToastService {
            clock,
            duration,
            capacity: capacity.max(1),
            toasts: VecDeque::new(),
        }
    }

    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) -> Uuid {
        self.push(kind, None, message.into())
    }

    pub fn show_titled(
        &mut self,
        kind: ToastKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Uuid {
        self.push(kind, Some(title.into()), message.into())
    }

    fn push(&mut self, kind: ToastKind, title: Option<String>, message: String) -> Uuid {
        let expires_at = self.clock.now() + self.duration;

        if let Some(existing) = self
            .toasts
            .iter_mut()
            .find(|t| t.kind == kind && t.title == title && t.message == message)
        {
            existing.repeats += 1;
            existing.expires_at = expires_at;
            return existing.id;
        }

        if self.toasts.len() >= self.capacity {
            if let Some(dropped) = self.toasts.pop_front() {
                debug!("toast capacity reached, dropping {:?}", dropped.message);
            }
        }

        let id = Uuid::new_v4();
        self.toasts.push_back(Toast {
            id,
            kind,
            title,
            message,
            repeats: 1,
            expires_at,
        });
        id
    }

    /// Manual dismissal; returns false if the toast was already gone.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop every toast whose time is up; returns how many went.
    pub fn expire(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires_at > now);
        before - self.toasts.len()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn last(&self) -> Option<&Toast> {
        self.toasts.back()
    }
}
