//! # Booking App Library
//!
//! Client-side orchestration for the appointment booking platform: which
//! view is showing, who is signed in, and what each view is doing.
//!
//! ## Module Organization
//! ```text
//! booking_app/
//! ├── lib.rs          ◄─── You are here (BookingApp wiring & tracing)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── router.rs   ◄─── AppRouter: session + view state machine
//! │   ├── session.rs  ◄─── SessionStore over a key/value backend
//! │   ├── notify.rs   ◄─── 5-second banner messages
//! │   ├── confirm.rs  ◄─── yes/no confirmation bridge
//! │   ├── wizard.rs   ◄─── public booking wizard
//! │   ├── auth.rs     ◄─── login / register forms
//! │   ├── dashboard.rs◄─── management lists
//! │   └── config.rs   ◄─── AppConfig (file + env)
//! ├── commands/       ◄─── Host-facing command functions
//! ├── messages.rs     ◄─── User-facing texts
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## View Mounting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  router.view()          mounted child                                   │
//! │  ─────────────          ─────────────                                   │
//! │  PublicBooking{id}  ──► BookingWizard(id), details loaded on mount      │
//! │  Dashboard          ──► Dashboard, lists loaded on mount                │
//! │  anything else      ──► neither (AuthFlow is always available)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod messages;
pub mod state;

#[cfg(test)]
mod test_support;

use std::sync::{Arc, Mutex};

use booking_client::{HttpBookingService, RemoteBookingService};
use booking_core::ViewState;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;
use url::Url;

use error::ApiError;
use state::{
    system_clock, AppConfig, AppRouter, AuthFlow, BookingWizard, Clock, Dashboard, FileStore,
    Navigator, NoOpNavigator, SessionStore,
};

// =============================================================================
// Booking App
// =============================================================================

/// Everything a host needs: router, the mounted view, and the API client.
pub struct BookingApp {
    config: AppConfig,
    router: AppRouter,
    service: Arc<dyn RemoteBookingService>,
    clock: Clock,
    auth: AuthFlow,
    wizard: Mutex<Option<BookingWizard>>,
    dashboard: Mutex<Option<Dashboard>>,
}

impl BookingApp {
    pub fn builder(config: AppConfig) -> BookingAppBuilder {
        BookingAppBuilder {
            config,
            service: None,
            store: None,
            navigator: None,
            clock: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn router(&self) -> &AppRouter {
        &self.router
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }

    /// The mounted booking wizard, if the PublicBooking view is active.
    pub fn wizard(&self) -> Result<BookingWizard, ApiError> {
        self.wizard
            .lock()
            .expect("Wizard slot mutex poisoned")
            .clone()
            .ok_or_else(|| ApiError::invalid_state("The booking page is not open."))
    }

    /// The mounted dashboard, if the Dashboard view is active.
    pub fn dashboard(&self) -> Result<Dashboard, ApiError> {
        self.dashboard
            .lock()
            .expect("Dashboard slot mutex poisoned")
            .clone()
            .ok_or_else(|| ApiError::invalid_state("The dashboard is not open."))
    }

    /// Bootstraps from the launch URL and mounts the resulting view.
    pub async fn start(&self, launch_url: &Url) -> ViewState {
        info!(url = %redacted(launch_url), "Starting booking app");
        self.router.bootstrap(launch_url);
        self.sync_view().await
    }

    /// Mounts the child for the router's current view and unmounts the rest.
    ///
    /// Call after any command that may change the view.
    pub async fn sync_view(&self) -> ViewState {
        match self.router.view() {
            ViewState::PublicBooking { establishment_id } => {
                self.set_dashboard(None);
                let mounted = self.wizard.lock().expect("Wizard slot mutex poisoned").clone();
                let same = mounted
                    .as_ref()
                    .is_some_and(|w| w.establishment_id() == establishment_id);
                if !same {
                    debug!(%establishment_id, "Mounting booking wizard");
                    let wizard = BookingWizard::new(
                        establishment_id,
                        self.router.clone(),
                        self.service.clone(),
                        self.clock.clone(),
                    );
                    self.set_wizard(Some(wizard.clone()));
                    if wizard.load().await.is_err() {
                        self.set_wizard(None);
                    }
                }
            }
            ViewState::Dashboard => {
                self.set_wizard(None);
                let mounted = self
                    .dashboard
                    .lock()
                    .expect("Dashboard slot mutex poisoned")
                    .is_some();
                if !mounted {
                    debug!("Mounting dashboard");
                    let dashboard = Dashboard::new(
                        self.router.clone(),
                        self.service.clone(),
                        self.config.app_origin.clone(),
                    );
                    self.set_dashboard(Some(dashboard.clone()));
                    if let Err(e) = dashboard.load_all().await {
                        warn!(error = %e, "Dashboard could not load");
                    }
                }
            }
            _ => {
                self.set_wizard(None);
                self.set_dashboard(None);
            }
        }
        self.router.view()
    }

    fn set_wizard(&self, wizard: Option<BookingWizard>) {
        *self.wizard.lock().expect("Wizard slot mutex poisoned") = wizard;
    }

    fn set_dashboard(&self, dashboard: Option<Dashboard>) {
        *self.dashboard.lock().expect("Dashboard slot mutex poisoned") = dashboard;
    }
}

/// Launch URL with any redirect token blanked, for logs.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "token" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return shown.to_string();
    }
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

// =============================================================================
// Builder
// =============================================================================

/// Wires a [`BookingApp`]. Unset parts get production defaults:
/// HTTP client on `api_base_url`, file-backed session, no-op navigator,
/// system clock.
pub struct BookingAppBuilder {
    config: AppConfig,
    service: Option<Arc<dyn RemoteBookingService>>,
    store: Option<SessionStore>,
    navigator: Option<Arc<dyn Navigator>>,
    clock: Option<Clock>,
}

impl BookingAppBuilder {
    pub fn service(mut self, service: Arc<dyn RemoteBookingService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<BookingApp, ApiError> {
        let config = self.config;
        config.validate()?;

        let service: Arc<dyn RemoteBookingService> = match self.service {
            Some(service) => service,
            None => Arc::new(HttpBookingService::new(
                &config.api_base_url,
                config.request_timeout(),
            )?),
        };

        let store = match self.store {
            Some(store) => store,
            None => match config.resolved_session_path() {
                Some(path) => {
                    info!(?path, "Session file");
                    SessionStore::new(Arc::new(FileStore::new(path)))
                }
                None => {
                    warn!("No data directory; session will not survive restarts");
                    SessionStore::in_memory()
                }
            },
        };

        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoOpNavigator));
        let clock = self.clock.unwrap_or_else(system_clock);
        let router = AppRouter::new(&config, store, navigator);
        let auth = AuthFlow::new(router.clone(), service.clone());

        Ok(BookingApp {
            config,
            router,
            service,
            clock,
            auth,
            wizard: Mutex::new(None),
            dashboard: Mutex::new(None),
        })
    }
}

// =============================================================================
// Tracing
// =============================================================================

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=booking_app=trace` - Trace for the app crate only
/// - Default: INFO, with debug for the booking crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,booking_app=debug,booking_client=debug,booking_core=debug")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}

// =============================================================================
// Unit Tests
// =============================================================================
