//! # Router Commands
//!
//! View state, session summary, banner messages, confirmations and the
//! plan catalog.
//!
//! ## View Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  start ──► Loading ──► Auth ◄──────────── logout ─────────┐             │
//! │               │         │                                 │             │
//! │               │         └── login ──► PlanSelection ──────┤             │
//! │               │                  └──► Dashboard ──────────┘             │
//! │               ├──► PublicBooking{id} ──(not found)──► Auth              │
//! │               └──► PaymentStatus ──(countdown 0 / go home)──► root      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use booking_core::plans::{plan_catalog, Plan};
use booking_core::{Notification, Role, ViewState};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::PendingConfirmation;
use crate::BookingApp;

/// What the UI may show about the signed-in account. Never carries the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub email: String,
    pub role: Role,
    pub establishment_id: Option<String>,
    pub plan_active: bool,
    pub plan_expires_at: Option<String>,
}

// =============================================================================
// Views
// =============================================================================

/// Gets the active view.
pub fn get_view(app: &BookingApp) -> ViewState {
    debug!("get_view command");
    app.router().view()
}

/// Gets the signed-in account, if any.
pub fn get_session(app: &BookingApp) -> Option<SessionSummary> {
    debug!("get_session command");
    app.router().session().map(|s| SessionSummary {
        email: s.email,
        role: s.role,
        establishment_id: s.establishment_id,
        plan_active: s.plan_active,
        plan_expires_at: s.plan_expires_at,
    })
}

/// Logs out from the Dashboard or PlanSelection view.
///
/// ## Returns
/// `Auth` on success; `INVALID_STATE` from any other view.
pub async fn logout(app: &BookingApp) -> Result<ViewState, ApiError> {
    debug!("logout command");
    app.router().handle_logout()?;
    Ok(app.sync_view().await)
}

/// Seconds left before the payment page leaves on its own.
pub fn get_countdown(app: &BookingApp) -> Option<u32> {
    app.router().countdown()
}

/// "Go home" on the payment status page.
pub async fn finish_payment_redirect(app: &BookingApp) -> Result<ViewState, ApiError> {
    debug!("finish_payment_redirect command");
    app.router().finish_payment_redirect()?;
    Ok(app.sync_view().await)
}

// =============================================================================
// Messages
// =============================================================================

/// Gets the banner message currently shown.
pub fn get_message(app: &BookingApp) -> Option<Notification> {
    app.router().messages().current()
}

/// Hides the banner before its timer runs out.
pub fn dismiss_message(app: &BookingApp) {
    debug!("dismiss_message command");
    app.router().messages().clear();
}

// =============================================================================
// Confirmations
// =============================================================================

/// Gets the open yes/no prompt, if any.
pub fn get_pending_confirmation(app: &BookingApp) -> Option<PendingConfirmation> {
    app.router().confirmations().pending()
}

/// Answers the open prompt.
///
/// ## Errors
/// `INVALID_STATE` when `id` is not the prompt currently open, e.g. it was
/// already answered or dismissed.
pub fn respond_confirmation(app: &BookingApp, id: u64, answer: bool) -> Result<(), ApiError> {
    debug!(id, answer, "respond_confirmation command");
    if app.router().confirmations().respond(id, answer) {
        Ok(())
    } else {
        Err(ApiError::invalid_state("That confirmation is no longer open."))
    }
}

/// Closes the open prompt; the waiting action sees "no".
pub fn dismiss_confirmation(app: &BookingApp) -> bool {
    debug!("dismiss_confirmation command");
    app.router().confirmations().dismiss()
}

// =============================================================================
// Plans
// =============================================================================

/// Gets the plans offered on the plan selection view.
pub fn get_plans() -> Vec<Plan> {
    plan_catalog()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::{AppConfig, SessionStore};
    use crate::test_support::{FakeService, RecordingNavigator};
    use booking_core::{PaymentOutcome, Session};
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    fn app_with(store: SessionStore) -> BookingApp {
        BookingApp::builder(AppConfig::default())
            .service(FakeService::new())
            .store(store)
            .navigator(Arc::new(RecordingNavigator::default()))
            .build()
            .unwrap()
    }

    fn owner() -> Session {
        Session {
            token: "h.p.s".into(),
            role: Role::Establishment,
            establishment_id: Some("7".into()),
            email: "owner@shop.test".into(),
            plan_active: false,
            plan_expires_at: Some("2025-01-01".into()),
        }
    }

    #[tokio::test]
    async fn test_logout_from_plan_selection() {
        let store = SessionStore::in_memory();
        store.save(&owner()).unwrap();
        let app = app_with(store.clone());
        app.start(&Url::parse("http://localhost:5173/").unwrap()).await;

        let summary = get_session(&app).unwrap();
        assert_eq!(summary.email, "owner@shop.test");
        assert!(!serde_json::to_string(&summary).unwrap().contains("h.p.s"));

        assert_eq!(logout(&app).await.unwrap(), ViewState::Auth);
        assert!(get_session(&app).is_none());
        assert!(store.load().is_none());

        let err = logout(&app).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_page_go_home() {
        let app = app_with(SessionStore::in_memory());
        let view = app
            .start(&Url::parse("http://localhost:5173/?status=success").unwrap())
            .await;
        assert_eq!(
            view,
            ViewState::PaymentStatus {
                outcome: PaymentOutcome::Success
            }
        );
        assert_eq!(get_countdown(&app), Some(5));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(get_countdown(&app), Some(4));

        assert_eq!(finish_payment_redirect(&app).await.unwrap(), ViewState::Auth);
        assert_eq!(get_countdown(&app), None);
        assert!(finish_payment_redirect(&app).await.is_err());
    }

    #[tokio::test]
    async fn test_respond_to_closed_confirmation_fails() {
        let app = app_with(SessionStore::in_memory());
        assert!(get_pending_confirmation(&app).is_none());
        assert!(!dismiss_confirmation(&app));
        let err = respond_confirmation(&app, 99, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn test_plans_listed_cheapest_first() {
        let plans = get_plans();
        assert!(!plans.is_empty());
        assert!(plans.windows(2).all(|w| w[0].monthly_price <= w[1].monthly_price));
    }
}
