//! Notification collaborator: transient user-facing messages.
//!
//! Fire-and-forget: the core never reads anything back.

use std::sync::Mutex;

pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
    fn notify_success(&self, message: &str);
}

/// Routes notifications into the tracing pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        tracing::warn!(message, "user notification");
    }

    fn notify_success(&self, message: &str) {
        tracing::info!(message, "user notification");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Error(String),
    Success(String),
}

/// Keeps every notification in order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    fn push(&self, notification: Notification) {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(notification);
    }
}

impl Notifier for MemoryNotifier {
    fn notify_error(&self, message: &str) {
        self.push(Notification::Error(message.to_owned()));
    }

    fn notify_success(&self, message: &str) {
        self.push(Notification::Success(message.to_owned()));
    }
}
