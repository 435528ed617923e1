//! # Message Channel
//!
//! One transient banner at a time.
//!
//! ```text
//! notify("A") ──► [A]──────── 5s ───────► clear if slot still holds A
//!        notify("B") ──► [B]───────── 5s ─────────► clear if slot holds B
//!                         ▲
//!                         └── A's timer fires here and finds B: no-op
//! ```
//!
//! A new message replaces the current one (no queue). Each message gets a
//! fresh id and its clear timer only removes a message with that id.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use booking_core::{MessageKind, Notification};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::spawn_timer;

/// Banner message slot with self-clearing timers.
#[derive(Clone)]
pub struct MessageChannel {
    inner: Arc<Inner>,
}

struct Inner {
    next_id: AtomicU64,
    display_for: Duration,
    tx: watch::Sender<Option<Notification>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().ok().and_then(Option::take) {
            timer.abort();
        }
    }
}

impl MessageChannel {
    pub fn new(display_for: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        MessageChannel {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                display_for,
                tx,
                timer: Mutex::new(None),
            }),
        }
    }

    /// Shows `text`, replacing any current message. Returns the message id.
    pub fn notify(&self, text: impl Into<String>, kind: MessageKind) -> u64 {
        // Held until the new timer is installed so the shown message and the
        // live timer always belong to the same notify call.
        let mut slot = self.inner.timer.lock().expect("Message timer mutex poisoned");

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            text: text.into(),
            kind,
        };
        debug!(id, ?kind, text = %notification.text, "Showing message");
        self.inner.tx.send_replace(Some(notification));

        let tx = self.inner.tx.clone();
        let display_for = self.inner.display_for;
        let timer = spawn_timer(async move {
            tokio::time::sleep(display_for).await;
            tx.send_if_modified(|current| match current {
                Some(n) if n.id == id => {
                    *current = None;
                    true
                }
                _ => false,
            });
        });

        if let Some(previous) = std::mem::replace(&mut *slot, timer) {
            previous.abort();
        }
        id
    }

    pub fn info(&self, text: impl Into<String>) -> u64 {
        self.notify(text, MessageKind::Info)
    }

    pub fn success(&self, text: impl Into<String>) -> u64 {
        self.notify(text, MessageKind::Success)
    }

    pub fn error(&self, text: impl Into<String>) -> u64 {
        self.notify(text, MessageKind::Error)
    }

    /// The message currently shown, if any.
    pub fn current(&self) -> Option<Notification> {
        self.inner.tx.borrow().clone()
    }

    /// Hides the current message immediately.
    pub fn clear(&self) {
        if let Some(timer) = self
            .inner
            .timer
            .lock()
            .expect("Message timer mutex poisoned")
            .take()
        {
            timer.abort();
        }
        self.inner.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.tx.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
