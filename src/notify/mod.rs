use crate::core::types::generate_id;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

/// How long a toast stays visible unless dismissed early
pub const DEFAULT_TOAST_TIMEOUT: Duration = Duration::from_millis(3500);

/// Visual category of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A single toast entry
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
}

/// Fire-and-forget toast notifications. Entries keep insertion order
/// and self-remove after their timeout, so growth is bounded by
/// expiry.
#[derive(Clone)]
pub struct NotificationCenter {
    toasts: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            toasts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a toast with the default timeout
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> String {
        self.notify_after(message, kind, DEFAULT_TOAST_TIMEOUT)
    }

    /// Append a toast that self-removes after `timeout`
    pub fn notify_after(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        timeout: Duration,
    ) -> String {
        let toast = Notification {
            id: generate_id(),
            message: message.into(),
            kind,
        };
        let id = toast.id.clone();
        debug!(id = %id, ?kind, "toast added");
        self.toasts.write().push(toast);

        let center = self.clone();
        let expired = id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            center.dismiss(&expired);
        });

        id
    }

    /// Remove a toast before its timeout fires
    pub fn dismiss(&self, id: &str) {
        self.toasts.write().retain(|n| n.id != id);
    }

    /// Snapshot of the currently visible toasts
    pub fn active(&self) -> Vec<Notification> {
        self.toasts.read().clone()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

/// The visible dialog content of a pending confirmation
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationPrompt {
    pub id: String,
    pub title: String,
    pub message: String,
}

struct PendingConfirmation {
    prompt: ConfirmationPrompt,
    responder: oneshot::Sender<bool>,
}

/// Queue of pending confirmation requests served one at a time.
///
/// The front request is the single visible dialog; further requests
/// wait their turn instead of overwriting it, so every caller is
/// guaranteed a resolution.
#[derive(Clone)]
pub struct ConfirmationQueue {
    pending: Arc<Mutex<VecDeque<PendingConfirmation>>>,
}

impl ConfirmationQueue {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Suspend the caller until the user accepts or declines. A
    /// dropped queue resolves as decline.
    pub async fn request(&self, message: &str, title: &str) -> bool {
        let (tx, rx) = oneshot::channel();
        let prompt = ConfirmationPrompt {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            message: message.to_string(),
        };
        debug!(id = %prompt.id, title, "confirmation requested");
        self.pending.lock().push_back(PendingConfirmation {
            prompt,
            responder: tx,
        });

        rx.await.unwrap_or(false)
    }

    /// The dialog awaiting a decision, if any
    pub fn current(&self) -> Option<ConfirmationPrompt> {
        self.pending.lock().front().map(|p| p.prompt.clone())
    }

    /// Answer the front request. Returns false when `id` does not name
    /// the front request, so a stale dialog cannot answer a newer one.
    pub fn resolve(&self, id: &str, accept: bool) -> bool {
        let mut pending = self.pending.lock();
        if !pending.front().is_some_and(|p| p.prompt.id == id) {
            return false;
        }
        if let Some(entry) = pending.pop_front() {
            debug!(id, accept, "confirmation resolved");
            let _ = entry.responder.send(accept);
            return true;
        }
        false
    }
}

impl Default for ConfirmationQueue {
    fn default() -> Self {
        Self::new()
    }
}
