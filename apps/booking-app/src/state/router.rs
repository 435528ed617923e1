//! # App Router
//!
//! Owns the session and the single active view.
//!
//! ## Bootstrap
//! ```text
//! launch URL
//!     │
//!     ├─ ?status=…            ──► PaymentStatus ── countdown 5…0 ──► root
//!     │
//!     ├─ ?token=…&plano=…     ──► decode payload ─┬─ ok:  save session
//!     │                                           └─ bad: clear session
//!     │                           strip query from visible URL
//!     │                           then continue ▼
//!     ├─ ?establishmentId=…   ──► PublicBooking { establishment_id }
//!     │
//!     └─ otherwise            ──► stored session?
//!                                   planActive  ──► Dashboard
//!                                   !planActive ──► PlanSelection
//!                                   none        ──► Auth
//! ```
//!
//! ## Transitions after bootstrap
//! ```text
//! Auth ── handle_auth_success ──► Dashboard | PlanSelection
//! Dashboard | PlanSelection ── handle_logout ──► Auth
//! PublicBooking ── redirect_to_auth ──► Auth
//! PaymentStatus ── finish_payment_redirect / countdown ──► root landing
//! ```
//!
//! Only the router writes the session and the view. Children hold a clone
//! and go through these methods.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use booking_core::{
    decode_token, BootstrapParams, BootstrapSignal, MessageKind, PaymentOutcome, Session,
    TokenDecode, ViewState,
};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::confirm::{ConfirmError, ConfirmationBridge};
use super::config::AppConfig;
use super::notify::MessageChannel;
use super::session::SessionStore;
use super::spawn_timer;
use crate::error::StorageError;

// =============================================================================
// Navigator
// =============================================================================

/// Host-side URL effects (implemented by the embedding shell).
pub trait Navigator: Send + Sync {
    /// Replaces the visible URL in history without reloading.
    fn replace_url(&self, url: &Url);

    /// Navigates to the application root.
    fn navigate_root(&self);
}

/// Navigator that does nothing, for headless runs and tests.
pub struct NoOpNavigator;

impl Navigator for NoOpNavigator {
    fn replace_url(&self, _url: &Url) {}
    fn navigate_root(&self) {}
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Cannot {action} from the {from} view")]
    NotAllowed {
        action: &'static str,
        from: &'static str,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

// =============================================================================
// Router
// =============================================================================

/// Session/view state machine. Cheap to clone.
#[derive(Clone)]
pub struct AppRouter {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    messages: MessageChannel,
    confirmations: ConfirmationBridge,
    countdown_secs: u32,
    bootstrapped: AtomicBool,
    state: Mutex<RouterState>,
    view_tx: watch::Sender<ViewState>,
    countdown_tx: watch::Sender<Option<u32>>,
}

#[derive(Default)]
struct RouterState {
    session: Option<Session>,
    countdown: Option<JoinHandle<()>>,
}

impl Drop for RouterInner {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut() {
            if let Some(countdown) = state.countdown.take() {
                countdown.abort();
            }
        }
        self.confirmations.close();
    }
}

impl AppRouter {
    pub fn new(config: &AppConfig, store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        let (view_tx, _) = watch::channel(ViewState::Loading);
        let (countdown_tx, _) = watch::channel(None);
        AppRouter {
            inner: Arc::new(RouterInner {
                store,
                navigator,
                messages: MessageChannel::new(config.message_duration()),
                confirmations: ConfirmationBridge::new(),
                countdown_secs: config.countdown_secs,
                bootstrapped: AtomicBool::new(false),
                state: Mutex::new(RouterState::default()),
                view_tx,
                countdown_tx,
            }),
        }
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut RouterState) -> R,
    {
        let mut state = self.inner.state.lock().expect("Router mutex poisoned");
        f(&mut state)
    }

    // =========================================================================
    // Read Interface
    // =========================================================================

    pub fn view(&self) -> ViewState {
        self.inner.view_tx.borrow().clone()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.inner.view_tx.subscribe()
    }

    pub fn session(&self) -> Option<Session> {
        self.with_state(|state| state.session.clone())
    }

    /// Seconds left on the payment status page, while it is shown.
    pub fn countdown(&self) -> Option<u32> {
        *self.inner.countdown_tx.borrow()
    }

    pub fn subscribe_countdown(&self) -> watch::Receiver<Option<u32>> {
        self.inner.countdown_tx.subscribe()
    }

    pub fn messages(&self) -> &MessageChannel {
        &self.inner.messages
    }

    pub fn confirmations(&self) -> &ConfirmationBridge {
        &self.inner.confirmations
    }

    /// Shows a banner message.
    pub fn notify(&self, text: impl Into<String>, kind: MessageKind) -> u64 {
        self.inner.messages.notify(text, kind)
    }

    /// Asks the user a yes/no question.
    pub async fn confirm(&self, prompt: impl Into<String>) -> Result<bool, ConfirmError> {
        self.inner.confirmations.confirm(prompt).await
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Decides the initial view from the launch URL. Runs once; later calls
    /// return the current view unchanged.
    pub fn bootstrap(&self, url: &Url) -> ViewState {
        if self.inner.bootstrapped.swap(true, Ordering::SeqCst) {
            debug!("Bootstrap already ran");
            return self.view();
        }

        let params = BootstrapParams::from_pairs(url.query_pairs());
        let view = match params.signal() {
            BootstrapSignal::PaymentStatus(outcome) => {
                self.show_payment_status(outcome);
                return self.view();
            }
            BootstrapSignal::AuthToken { token, .. } => {
                let session = self.consume_token(&token, url);
                match (params.establishment_id, session) {
                    (Some(establishment_id), _) => ViewState::PublicBooking { establishment_id },
                    (None, Some(session)) => ViewState::for_session(&session),
                    (None, None) => ViewState::Auth,
                }
            }
            BootstrapSignal::PublicEstablishment { establishment_id } => {
                ViewState::PublicBooking { establishment_id }
            }
            BootstrapSignal::None => self.restore_view(),
        };

        self.set_view(view.clone());
        view
    }

    /// Persists the session carried by a redirect token, then strips the
    /// token from the visible URL either way.
    ///
    /// Returns the decoded session, which stays active even when it could
    /// not be written to the store.
    fn consume_token(&self, token: &str, url: &Url) -> Option<Session> {
        let session = match decode_token(token) {
            TokenDecode::Decoded(claims) => {
                let session = claims.into_session(token);
                info!(role = %session.role, plan_active = session.plan_active, "Session from redirect token");
                if let Err(e) = self.inner.store.save(&session) {
                    warn!(error = %e, "Could not persist redirect session");
                }
                Some(session)
            }
            TokenDecode::Malformed(e) => {
                warn!(error = %e, "Ignoring malformed redirect token");
                if let Err(e) = self.inner.store.clear() {
                    warn!(error = %e, "Could not clear stored session");
                }
                None
            }
        };
        self.with_state(|state| state.session = session.clone());

        let mut visible = url.clone();
        visible.set_query(None);
        self.inner.navigator.replace_url(&visible);
        session
    }

    /// Landing view for whatever session is stored.
    fn restore_view(&self) -> ViewState {
        let session = self.inner.store.load();
        let view = session
            .as_ref()
            .map(ViewState::for_session)
            .unwrap_or(ViewState::Auth);
        debug!(restored = session.is_some(), view = view.name(), "Session restore");
        self.with_state(|state| state.session = session);
        view
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn set_view(&self, view: ViewState) {
        if !matches!(view, ViewState::PaymentStatus { .. }) {
            self.stop_countdown();
        }
        info!(view = view.name(), "View changed");
        self.inner.view_tx.send_replace(view);
    }

    /// Saves a freshly authenticated session and lands on its view.
    pub fn handle_auth_success(&self, session: Session) -> Result<ViewState, StorageError> {
        self.inner.store.save(&session)?;
        let view = ViewState::for_session(&session);
        self.with_state(|state| state.session = Some(session));
        self.set_view(view.clone());
        Ok(view)
    }

    /// Destroys the session and returns to Auth.
    ///
    /// Only the Dashboard and PlanSelection views offer logout.
    pub fn handle_logout(&self) -> Result<ViewState, TransitionError> {
        let current = self.view();
        if !matches!(current, ViewState::Dashboard | ViewState::PlanSelection) {
            warn!(view = current.name(), "Logout ignored outside the authenticated area");
            return Err(TransitionError::NotAllowed {
                action: "log out",
                from: current.name(),
            });
        }

        let cleared = self.inner.store.clear();
        self.with_state(|state| state.session = None);
        self.set_view(ViewState::Auth);
        info!("Logged out");
        cleared?;
        Ok(ViewState::Auth)
    }

    /// Sends the user to Auth, e.g. when a booking page cannot load.
    pub fn redirect_to_auth(&self) {
        debug!(from = self.view().name(), "Redirecting to auth");
        self.set_view(ViewState::Auth);
    }

    /// "Go home" on the payment status page.
    pub fn finish_payment_redirect(&self) -> Result<ViewState, TransitionError> {
        let current = self.view();
        if !matches!(current, ViewState::PaymentStatus { .. }) {
            return Err(TransitionError::NotAllowed {
                action: "leave the payment page",
                from: current.name(),
            });
        }
        Ok(self.land_at_root())
    }

    /// Navigates to the root and shows what a fresh load there would show.
    fn land_at_root(&self) -> ViewState {
        self.inner.navigator.navigate_root();
        let view = self.restore_view();
        self.set_view(view.clone());
        view
    }

    // =========================================================================
    // Payment Countdown
    // =========================================================================

    fn show_payment_status(&self, outcome: PaymentOutcome) {
        info!(?outcome, "Payment status page");
        self.set_view(ViewState::PaymentStatus { outcome });

        let secs = self.inner.countdown_secs;
        self.inner.countdown_tx.send_replace(Some(secs));

        let weak = Arc::downgrade(&self.inner);
        let task = spawn_timer(run_countdown(weak, secs));
        let previous = self.with_state(|state| std::mem::replace(&mut state.countdown, task));
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn stop_countdown(&self) {
        if let Some(task) = self.with_state(|state| state.countdown.take()) {
            task.abort();
        }
        self.inner.countdown_tx.send_replace(None);
    }
}

/// Ticks once per second down to zero, then lands at the root. Exits
/// quietly if the router is gone.
async fn run_countdown(router: Weak<RouterInner>, secs: u32) {
    let mut remaining = secs;
    while remaining > 0 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        remaining -= 1;
        let Some(inner) = router.upgrade() else {
            return;
        };
        inner.countdown_tx.send_replace(Some(remaining));
    }

    let Some(inner) = router.upgrade() else {
        return;
    };
    let router = AppRouter { inner };
    // Detach our own handle so leaving the view does not abort this task.
    drop(router.with_state(|state| state.countdown.take()));
    debug!("Payment countdown finished");
    router.land_at_root();
}

// =============================================================================
// Unit Tests
// =============================================================================
