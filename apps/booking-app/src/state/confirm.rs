//! # Confirmation Bridge
//!
//! Lets a child flow ask the user a yes/no question and await the answer.
//!
//! ```text
//!   Dashboard                    Bridge                      Host UI
//!   ─────────                    ──────                      ───────
//!   confirm("Remove?") ──► slot = {id, prompt, tx} ──► watch: Some(prompt)
//!        .await                                              [Yes] [No] [x]
//!          ▲                                                    │
//!          └───────── rx ◄── respond(id, true|false) ◄──────────┘
//!                            dismiss()  → false
//!                            close()    → false
//! ```
//!
//! Single slot: while one question is open, another `confirm` fails with
//! [`ConfirmError::AlreadyPending`] without touching the open one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmError {
    #[error("Another confirmation is already open")]
    AlreadyPending,
}

/// The open question, as shown to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConfirmation {
    pub id: u64,
    pub prompt: String,
}

struct Slot {
    id: u64,
    responder: oneshot::Sender<bool>,
}

struct Shared {
    next_id: AtomicU64,
    slot: Mutex<Option<Slot>>,
    prompt_tx: watch::Sender<Option<PendingConfirmation>>,
}

impl Shared {
    /// Removes the slot if it still belongs to `id`. Returns its responder.
    fn take_if(&self, id: Option<u64>) -> Option<Slot> {
        let mut slot = self.slot.lock().expect("Confirmation mutex poisoned");
        match (&*slot, id) {
            (Some(open), Some(id)) if open.id != id => return None,
            (None, _) => return None,
            _ => {}
        }
        let taken = slot.take();
        drop(slot);
        self.prompt_tx.send_replace(None);
        taken
    }
}

/// Clears the slot if the awaiting `confirm` future is dropped early.
struct SlotGuard<'a> {
    shared: &'a Shared,
    id: u64,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.shared.take_if(Some(self.id));
    }
}

/// Single-slot yes/no mailbox.
#[derive(Clone)]
pub struct ConfirmationBridge {
    shared: Arc<Shared>,
}

impl Default for ConfirmationBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationBridge {
    pub fn new() -> Self {
        let (prompt_tx, _rx) = watch::channel(None);
        ConfirmationBridge {
            shared: Arc::new(Shared {
                next_id: AtomicU64::new(1),
                slot: Mutex::new(None),
                prompt_tx,
            }),
        }
    }

    /// Opens `prompt` and waits for the answer.
    ///
    /// Resolves to `false` when dismissed or when the bridge is closed.
    pub async fn confirm(&self, prompt: impl Into<String>) -> Result<bool, ConfirmError> {
        let prompt = prompt.into();
        let (tx, rx) = oneshot::channel();

        let id = {
            let mut slot = self.shared.slot.lock().expect("Confirmation mutex poisoned");
            if slot.is_some() {
                warn!(%prompt, "Confirmation requested while another is open");
                return Err(ConfirmError::AlreadyPending);
            }
            let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
            *slot = Some(Slot { id, responder: tx });
            id
        };

        debug!(id, %prompt, "Confirmation opened");
        self.shared
            .prompt_tx
            .send_replace(Some(PendingConfirmation { id, prompt }));

        let _guard = SlotGuard {
            shared: &self.shared,
            id,
        };
        let answer = rx.await.unwrap_or(false);
        debug!(id, answer, "Confirmation resolved");
        Ok(answer)
    }

    /// Answers question `id`. Returns false if it is no longer open.
    pub fn respond(&self, id: u64, answer: bool) -> bool {
        match self.shared.take_if(Some(id)) {
            Some(slot) => slot.responder.send(answer).is_ok(),
            None => false,
        }
    }

    /// Closes whatever question is open, answering `false`.
    pub fn dismiss(&self) -> bool {
        match self.shared.take_if(None) {
            Some(slot) => slot.responder.send(false).is_ok(),
            None => false,
        }
    }

    /// Tears the bridge down. An awaiting `confirm` resolves to `false`.
    pub fn close(&self) {
        // Dropping the responder wakes the receiver with an error.
        drop(self.shared.take_if(None));
    }

    pub fn pending(&self) -> Option<PendingConfirmation> {
        self.shared.prompt_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PendingConfirmation>> {
        self.shared.prompt_tx.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    type Answer = tokio::task::JoinHandle<Result<bool, ConfirmError>>;

    /// Spawns a `confirm` and waits until the host would see it.
    async fn open(bridge: &ConfirmationBridge, prompt: &str) -> (Answer, u64) {
        let mut rx = bridge.subscribe();
        let task = {
            let bridge = bridge.clone();
            let prompt = prompt.to_string();
            tokio::spawn(async move { bridge.confirm(prompt).await })
        };
        rx.wait_for(|p| p.is_some()).await.unwrap();
        let id = bridge.pending().unwrap().id;
        (task, id)
    }

    #[tokio::test]
    async fn test_yes_and_no_answers() {
        let bridge = ConfirmationBridge::new();

        let (task, id) = open(&bridge, "Remove?").await;
        assert_eq!(bridge.pending().unwrap().prompt, "Remove?");
        assert!(bridge.respond(id, true));
        assert_eq!(task.await.unwrap(), Ok(true));
        assert_eq!(bridge.pending(), None);

        let (task, id) = open(&bridge, "Remove?").await;
        assert!(bridge.respond(id, false));
        assert_eq!(task.await.unwrap(), Ok(false));
    }

    #[tokio::test]
    async fn test_dismiss_and_close_resolve_false() {
        let bridge = ConfirmationBridge::new();

        let (task, _) = open(&bridge, "Remove?").await;
        assert!(bridge.dismiss());
        assert_eq!(task.await.unwrap(), Ok(false));

        let (task, _) = open(&bridge, "Remove?").await;
        bridge.close();
        assert_eq!(task.await.unwrap(), Ok(false));
        assert!(!bridge.dismiss());
    }

    #[tokio::test]
    async fn test_second_request_rejected_while_pending() {
        let bridge = ConfirmationBridge::new();
        let (task, id) = open(&bridge, "first").await;

        assert_eq!(bridge.confirm("second").await, Err(ConfirmError::AlreadyPending));
        assert_eq!(bridge.pending().unwrap().prompt, "first");

        assert!(bridge.respond(id, true));
        assert_eq!(task.await.unwrap(), Ok(true));
    }

    #[tokio::test]
    async fn test_stale_id_is_ignored() {
        let bridge = ConfirmationBridge::new();
        let (task, id) = open(&bridge, "Remove?").await;

        assert!(!bridge.respond(id + 100, true));
        assert!(bridge.pending().is_some());
        assert!(bridge.respond(id, false));
        assert_eq!(task.await.unwrap(), Ok(false));
    }

    #[tokio::test]
    async fn test_abandoned_request_frees_slot() {
        let bridge = ConfirmationBridge::new();
        let (task, _) = open(&bridge, "Remove?").await;
        task.abort();
        let _ = task.await;

        assert_eq!(bridge.pending(), None);
        let (task, id) = open(&bridge, "again").await;
        bridge.respond(id, true);
        assert_eq!(task.await.unwrap(), Ok(true));
    }
}
