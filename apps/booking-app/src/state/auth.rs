//! # Auth Forms
//!
//! Login and registration on the Auth view.
//!
//! ```text
//! ┌──────────── Login ────────────┐      ┌────────── Register ──────────┐
//! │ email, password               │ ◄──► │ email, password, role,       │
//! │ POST /auth/login              │      │ establishmentId (employees)  │
//! │ ok → router.handle_auth_success│      │ POST /auth/register          │
//! └───────────────────────────────┘      │ ok → back to Login mode      │
//!                                        └──────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use booking_client::{RegisterRequest, RemoteBookingService};
use booking_core::validation::{validate_login, validate_registration};
use booking_core::{MessageKind, Role, ViewState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::router::AppRouter;
use crate::error::ApiError;
use crate::messages;

/// Which form the Auth view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Registration form input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub establishment_id: Option<String>,
}

/// Login / register flows.
#[derive(Clone)]
pub struct AuthFlow {
    router: AppRouter,
    service: Arc<dyn RemoteBookingService>,
    mode: Arc<Mutex<AuthMode>>,
}

impl AuthFlow {
    pub fn new(router: AppRouter, service: Arc<dyn RemoteBookingService>) -> Self {
        AuthFlow {
            router,
            service,
            mode: Arc::new(Mutex::new(AuthMode::Login)),
        }
    }

    pub fn mode(&self) -> AuthMode {
        *self.mode.lock().expect("Auth mode mutex poisoned")
    }

    pub fn set_mode(&self, mode: AuthMode) {
        *self.mode.lock().expect("Auth mode mutex poisoned") = mode;
    }

    fn fail(&self, err: ApiError) -> ApiError {
        self.router.notify(err.message.clone(), MessageKind::Error);
        err
    }

    /// Logs in and lands on the session's view.
    pub async fn login(&self, email: &str, password: &str) -> Result<ViewState, ApiError> {
        if self.router.view() != ViewState::Auth {
            return Err(ApiError::invalid_state("Login is only available on the login page."));
        }
        if let Err(e) = validate_login(email, password) {
            debug!(field = e.field(), "Login form incomplete");
            return Err(self.fail(ApiError::validation(messages::FILL_ALL_FIELDS)));
        }

        let session = match self.service.login(email.trim(), password).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Login failed");
                return Err(self.fail(ApiError::from_client(e, messages::LOGIN_FAILED)));
            }
        };

        let view = match self.router.handle_auth_success(session) {
            Ok(view) => view,
            Err(e) => return Err(self.fail(e.into())),
        };
        info!(view = view.name(), "Logged in");
        self.router.notify(messages::LOGIN_SUCCESS, MessageKind::Success);
        self.set_mode(AuthMode::Login);
        Ok(view)
    }

    /// Registers an account. Returns the confirmation text shown to the user.
    pub async fn register(&self, form: RegistrationForm) -> Result<String, ApiError> {
        let establishment_id = match validate_registration(
            &form.email,
            &form.password,
            form.role,
            form.establishment_id.as_deref(),
        ) {
            Ok(id) => id.map(|id| id.trim().to_string()),
            Err(e) => {
                debug!(field = e.field(), "Registration form incomplete");
                return Err(self.fail(ApiError::validation(messages::FILL_ALL_FIELDS)));
            }
        };

        let request = RegisterRequest {
            email: form.email.trim().to_string(),
            password: form.password,
            role: form.role,
            establishment_id,
        };

        match self.service.register(&request).await {
            Ok(note) => {
                let text = note
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| messages::REGISTER_SUCCESS.to_string());
                info!(role = %request.role, "Registered");
                self.router.notify(text.clone(), MessageKind::Success);
                self.set_mode(AuthMode::Login);
                Ok(text)
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                Err(self.fail(ApiError::from_client(e, messages::REGISTER_FAILED)))
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, StorageError};
    use crate::state::{AppConfig, KeyValueStore, SessionStore};
    use crate::test_support::{FakeService, RecordingNavigator};
    use booking_client::ClientError;
    use booking_core::Session;
    use std::collections::BTreeMap;
    use url::Url;

    fn setup() -> (AuthFlow, AppRouter, Arc<FakeService>, SessionStore) {
        let service = FakeService::new();
        let store = SessionStore::in_memory();
        let router = AppRouter::new(
            &AppConfig::default(),
            store.clone(),
            Arc::new(RecordingNavigator::default()),
        );
        router.bootstrap(&Url::parse("http://localhost:5173/").unwrap());
        (AuthFlow::new(router.clone(), service.clone()), router, service, store)
    }

    fn session(plan_active: bool) -> Session {
        Session {
            token: "h.p.s".into(),
            role: Role::Establishment,
            establishment_id: Some("7".into()),
            email: "owner@shop.test".into(),
            plan_active,
            plan_expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_login_lands_on_plan_selection_without_plan() {
        let (auth, router, service, store) = setup();
        service.with(|s| s.login = Some(Ok(session(false))));

        let view = auth.login("owner@shop.test", "secret").await.unwrap();
        assert_eq!(view, ViewState::PlanSelection);
        assert_eq!(store.load(), Some(session(false)));
        assert_eq!(router.messages().current().unwrap().text, messages::LOGIN_SUCCESS);
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
            Ok(BTreeMap::new())
        }

        fn apply(&self, _: BTreeMap<String, String>, _: &[&str]) -> Result<(), StorageError> {
            Err(StorageError::Encode("read-only".into()))
        }
    }

    #[tokio::test]
    async fn test_login_not_announced_when_session_cannot_be_saved() {
        let service = FakeService::new();
        service.with(|s| s.login = Some(Ok(session(true))));
        let router = AppRouter::new(
            &AppConfig::default(),
            SessionStore::new(Arc::new(ReadOnlyStore)),
            Arc::new(RecordingNavigator::default()),
        );
        router.bootstrap(&Url::parse("http://localhost:5173/").unwrap());
        let auth = AuthFlow::new(router.clone(), service);

        let err = auth.login("owner@shop.test", "secret").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert_eq!(router.view(), ViewState::Auth);
        let banner = router.messages().current().unwrap();
        assert_eq!(banner.kind, MessageKind::Error);
        assert_ne!(banner.text, messages::LOGIN_SUCCESS);
    }

    #[tokio::test]
    async fn test_login_rejection_shows_server_text() {
        let (auth, router, service, _) = setup();
        service.with(|s| {
            s.login = Some(Err(ClientError::Rejected {
                status: 401,
                message: Some("Invalid credentials".into()),
            }))
        });

        let err = auth.login("owner@shop.test", "bad").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ServerRejection);
        assert_eq!(err.message, "Invalid credentials");
        assert_eq!(router.view(), ViewState::Auth);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let (auth, _, service, _) = setup();
        let err = auth.login("  ", "secret").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_employee_registration_needs_establishment() {
        let (auth, _, service, _) = setup();
        auth.set_mode(AuthMode::Register);

        let form = RegistrationForm {
            email: "e@shop.test".into(),
            password: "pw".into(),
            role: Role::Employee,
            establishment_id: Some("   ".into()),
        };
        assert!(auth.register(form.clone()).await.is_err());
        assert!(service.calls().is_empty());

        let text = auth
            .register(RegistrationForm {
                establishment_id: Some("7".into()),
                ..form
            })
            .await
            .unwrap();
        assert_eq!(text, messages::REGISTER_SUCCESS);
        assert_eq!(auth.mode(), AuthMode::Login);
    }

    #[tokio::test]
    async fn test_registration_uses_server_note_and_failure_text() {
        let (auth, router, service, _) = setup();
        service.with(|s| s.register = Some(Ok(Some("Welcome aboard".into()))));
        let form = RegistrationForm {
            email: "o@shop.test".into(),
            password: "pw".into(),
            role: Role::Establishment,
            establishment_id: None,
        };
        assert_eq!(auth.register(form.clone()).await.unwrap(), "Welcome aboard");

        service.with(|s| {
            s.register = Some(Err(ClientError::Rejected {
                status: 400,
                message: None,
            }))
        });
        auth.set_mode(AuthMode::Register);
        let err = auth.register(form).await.unwrap_err();
        assert_eq!(err.message, messages::REGISTER_FAILED);
        assert_eq!(auth.mode(), AuthMode::Register);
        assert_eq!(router.messages().current().unwrap().text, messages::REGISTER_FAILED);
    }
}
