//! Presentation-layer error boundary.
//!
//! The catalog client only returns typed errors. The boundary listens to
//! the cache's event stream and turns each failed attempt into a toast.

use std::sync::Arc;

use showcase_cache::QueryEvent;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Toast text when a failure carries no message.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Toast text for the inert "Add to Cart" action.
pub const CART_NOT_INTEGRATED: &str = "Not integrated yet!";

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastLevel {
    Success,
    Error,
}

/// A transient user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Displays toasts. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Maps query events to toasts.
#[derive(Clone)]
pub struct ErrorBoundary {
    notifier: Arc<dyn Notifier>,
}

impl ErrorBoundary {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Toast for one event, if it warrants one.
    pub fn toast_for(event: &QueryEvent) -> Option<Toast> {
        match event {
            QueryEvent::AttemptFailed { error, .. } => {
                let message = error.to_string();
                if message.is_empty() {
                    Some(Toast::error(UNEXPECTED_ERROR_MESSAGE))
                } else {
                    Some(Toast::error(message))
                }
            }
            QueryEvent::Settled { .. } => None,
        }
    }

    /// Notify for one event. Returns `true` if a toast was shown.
    pub fn handle(&self, event: &QueryEvent) -> bool {
        match Self::toast_for(event) {
            Some(toast) => {
                debug!(key = %event.key(), "error toast");
                self.notifier.notify(toast);
                true
            }
            None => false,
        }
    }

    /// Handle every event already queued on `events` without waiting.
    /// Returns the number of toasts shown.
    pub fn drain(&self, events: &mut broadcast::Receiver<QueryEvent>) -> usize {
        let mut shown = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    if self.handle(&event) {
                        shown += 1;
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "error boundary fell behind, dropped events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return shown,
            }
        }
    }

    /// Drain `events` until every sender is gone.
    pub async fn run(self, mut events: broadcast::Receiver<QueryEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "error boundary fell behind, dropped events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Run on a background task.
    pub fn spawn(self, events: broadcast::Receiver<QueryEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
