//! # HTTP Implementation
//!
//! [`RemoteBookingService`] over `reqwest`.
//!
//! ## Request Pipeline
//! ```text
//! endpoint(&["establishment", id, "services"])   ◄── segments are percent-encoded
//!        │
//!        ▼
//! reqwest::RequestBuilder (+ bearer token, + JSON body)
//!        │
//!        ▼
//! send() ── Err ──► ClientError::Network / Timeout
//!        │
//!        ▼
//! status 2xx? ── no ──► 404 → NotFound, else Rejected { status, message }
//!        │ yes
//!        ▼
//! decode body ── Err ──► InvalidResponse
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use booking_core::{
    Appointment, AppointmentStatus, AvailabilityQuery, BookingRequest, Employee,
    EstablishmentDetails, EstablishmentProfile, ServiceOffering, Session, WeeklyAvailability,
};

use crate::error::{ClientError, ClientResult};
use crate::service::{
    AppointmentScope, LoginRequest, LoginResponse, MessageBody, NewEmployee, NewService,
    RegisterRequest, RemoteBookingService, StatusUpdate,
};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// REST client for the booking API.
#[derive(Debug, Clone)]
pub struct HttpBookingService {
    http: Client,
    base_url: Url,
}

impl HttpBookingService {
    /// Creates a client for `base_url` (e.g. `http://localhost:3000/api`).
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("booking-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(HttpBookingService { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed before a response arrived");
            ClientError::from(e)
        })
    }

    /// Turns a non-2xx response into an error, reading `{message}` if present.
    async fn check(response: Response, resource: &str) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<MessageBody>()
            .await
            .ok()
            .and_then(|body| body.message);
        debug!(status = status.as_u16(), resource, "Request rejected");

        if status == StatusCode::NOT_FOUND {
            Err(ClientError::NotFound {
                resource: resource.to_string(),
                message,
            })
        } else {
            Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        segments: &[&str],
        resource: &str,
    ) -> ClientResult<T> {
        let mut request = self.http.get(self.endpoint(segments)?);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = Self::check(self.send(request).await?, resource).await?;
        Self::json(response).await
    }
}

#[async_trait]
impl RemoteBookingService for HttpBookingService {
    async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        debug!("Logging in");
        let request = self
            .http
            .post(self.endpoint(&["auth", "login"])?)
            .json(&LoginRequest { email, password });
        let response = Self::check(self.send(request).await?, "account").await?;
        let body: LoginResponse = Self::json(response).await?;
        Ok(body.into_session(email))
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<Option<String>> {
        debug!(role = %request.role, "Registering account");
        let req = self
            .http
            .post(self.endpoint(&["auth", "register"])?)
            .json(request);
        let response = Self::check(self.send(req).await?, "account").await?;
        let body: MessageBody = response.json().await.unwrap_or_default();
        Ok(body.message)
    }

    async fn establishment_details(
        &self,
        establishment_id: &str,
    ) -> ClientResult<EstablishmentDetails> {
        debug!(establishment_id, "Fetching public establishment details");
        self.get_json(
            None,
            &["establishment", "public", establishment_id],
            "Establishment",
        )
        .await
    }

    async fn availability(&self, query: &AvailabilityQuery) -> ClientResult<Vec<String>> {
        debug!(
            generation = query.generation,
            employee_id = %query.employee_id,
            date = %query.date,
            "Fetching availability"
        );
        let request = self
            .http
            .post(self.endpoint(&["booking", "availability"])?)
            .json(query);
        let response = Self::check(self.send(request).await?, "availability").await?;
        Self::json(response).await
    }

    async fn book(&self, request: &BookingRequest) -> ClientResult<()> {
        debug!(
            establishment_id = %request.establishment_id,
            at = %request.appointment_date_time,
            "Submitting booking"
        );
        let req = self.http.post(self.endpoint(&["booking"])?).json(request);
        Self::check(self.send(req).await?, "booking").await?;
        Ok(())
    }

    async fn establishment_profile(
        &self,
        token: &str,
        establishment_id: &str,
    ) -> ClientResult<EstablishmentProfile> {
        self.get_json(Some(token), &["establishment", establishment_id], "Establishment")
            .await
    }

    async fn update_establishment_profile(
        &self,
        token: &str,
        establishment_id: &str,
        profile: &EstablishmentProfile,
    ) -> ClientResult<()> {
        let request = self
            .http
            .put(self.endpoint(&["establishment", establishment_id])?)
            .bearer_auth(token)
            .json(profile);
        Self::check(self.send(request).await?, "Establishment").await?;
        Ok(())
    }

    async fn employees(&self, token: &str, establishment_id: &str) -> ClientResult<Vec<Employee>> {
        self.get_json(
            Some(token),
            &["establishment", establishment_id, "employees"],
            "Employees",
        )
        .await
    }

    async fn add_employee(
        &self,
        token: &str,
        establishment_id: &str,
        employee: &NewEmployee,
    ) -> ClientResult<()> {
        let request = self
            .http
            .post(self.endpoint(&["establishment", establishment_id, "employees"])?)
            .bearer_auth(token)
            .json(employee);
        Self::check(self.send(request).await?, "Establishment").await?;
        Ok(())
    }

    async fn delete_employee(&self, token: &str, employee_id: &str) -> ClientResult<()> {
        let request = self
            .http
            .delete(self.endpoint(&["employees", employee_id])?)
            .bearer_auth(token);
        Self::check(self.send(request).await?, "Employee").await?;
        Ok(())
    }

    async fn employee_availability(
        &self,
        token: &str,
        employee_id: &str,
    ) -> ClientResult<Vec<WeeklyAvailability>> {
        self.get_json(
            Some(token),
            &["employees", employee_id, "availability"],
            "Employee",
        )
        .await
    }

    async fn update_employee_availability(
        &self,
        token: &str,
        employee_id: &str,
        windows: &[WeeklyAvailability],
    ) -> ClientResult<()> {
        let request = self
            .http
            .put(self.endpoint(&["employees", employee_id, "availability"])?)
            .bearer_auth(token)
            .json(windows);
        Self::check(self.send(request).await?, "Employee").await?;
        Ok(())
    }

    async fn services(
        &self,
        token: &str,
        establishment_id: &str,
    ) -> ClientResult<Vec<ServiceOffering>> {
        self.get_json(
            Some(token),
            &["establishment", establishment_id, "services"],
            "Services",
        )
        .await
    }

    async fn add_service(
        &self,
        token: &str,
        establishment_id: &str,
        service: &NewService,
    ) -> ClientResult<()> {
        let request = self
            .http
            .post(self.endpoint(&["establishment", establishment_id, "services"])?)
            .bearer_auth(token)
            .json(service);
        Self::check(self.send(request).await?, "Establishment").await?;
        Ok(())
    }

    async fn delete_service(&self, token: &str, service_id: &str) -> ClientResult<()> {
        let request = self
            .http
            .delete(self.endpoint(&["services", service_id])?)
            .bearer_auth(token);
        Self::check(self.send(request).await?, "Service").await?;
        Ok(())
    }

    async fn appointments(
        &self,
        token: &str,
        scope: &AppointmentScope,
    ) -> ClientResult<Vec<Appointment>> {
        self.get_json(Some(token), &scope.segments(), "Appointments")
            .await
    }

    async fn update_appointment_status(
        &self,
        token: &str,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> ClientResult<()> {
        debug!(appointment_id, %status, "Updating appointment status");
        let request = self
            .http
            .put(self.endpoint(&["appointments", appointment_id, "status"])?)
            .bearer_auth(token)
            .json(&StatusUpdate { status });
        Self::check(self.send(request).await?, "Appointment").await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        let svc = HttpBookingService::new("http://localhost:3000/api", DEFAULT_TIMEOUT).unwrap();
        let url = svc.endpoint(&["establishment", "a b/c", "services"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/establishment/a%20b%2Fc/services"
        );
    }

    #[test]
    fn test_trailing_slash_base_url() {
        let svc = HttpBookingService::new("http://localhost:3000/api/", DEFAULT_TIMEOUT).unwrap();
        let url = svc.endpoint(&["auth", "login"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/auth/login");
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(matches!(
            HttpBookingService::new("mailto:someone@example.com", DEFAULT_TIMEOUT),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(HttpBookingService::new("not a url", DEFAULT_TIMEOUT).is_err());
    }
}
