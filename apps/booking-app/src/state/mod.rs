//! # State Module
//!
//! Application state for the booking client.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        AppRouter                                │   │
//! │  │  view (watch)   session   countdown (watch)                     │   │
//! │  │  ┌────────────────┐  ┌────────────────────┐  ┌──────────────┐  │   │
//! │  │  │ MessageChannel │  │ ConfirmationBridge │  │ SessionStore │  │   │
//! │  │  └────────────────┘  └────────────────────┘  └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │          ▲                     ▲                      ▲                 │
//! │          │ clone               │ clone                │ clone           │
//! │  ┌──────────────┐    ┌──────────────────┐    ┌──────────────────┐      │
//! │  │   AuthFlow   │    │  BookingWizard   │    │    Dashboard     │      │
//! │  │  (Auth view) │    │ (PublicBooking)  │    │   (Dashboard)    │      │
//! │  └──────────────┘    └──────────────────┘    └──────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Each state type wraps Arc<Mutex<T>>; locks never span an await      │
//! │  • View, message, prompt and countdown are tokio watch channels        │
//! │  • AppConfig: read-only after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::warn;

mod auth;
mod config;
mod confirm;
mod dashboard;
mod notify;
mod router;
mod session;
mod wizard;

pub use auth::{AuthFlow, AuthMode, RegistrationForm};
pub use config::AppConfig;
pub use confirm::{ConfirmError, ConfirmationBridge, PendingConfirmation};
pub use dashboard::{Dashboard, DashboardState, DayWindow, ListState, WeeklySchedule};
pub use notify::MessageChannel;
pub use router::{AppRouter, Navigator, NoOpNavigator, TransitionError};
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionStore, SESSION_KEYS};
pub use wizard::{system_clock, BookingWizard, Clock, WizardSnapshot};

/// Spawns a timer task on the current runtime.
///
/// Outside a runtime the timer is skipped, so the state it would have
/// changed simply stays as it is.
pub(crate) fn spawn_timer<F>(task: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(task)),
        Err(_) => {
            warn!("No async runtime; timer not started");
            None
        }
    }
}
