//! # Bootstrap Classification
//!
//! Decides, once per page load, what the URL query asks the app to do.
//!
//! ## Priority (first match wins)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bootstrap Signal Priority                          │
//! │                                                                         │
//! │   ?status=…                 ──► PaymentStatus(outcome)                  │
//! │        │ absent                                                         │
//! │        ▼                                                                │
//! │   ?token=…&plano=…          ──► AuthToken { token, plan_flag }          │
//! │        │ absent                                                         │
//! │        ▼                                                                │
//! │   ?establishmentId=…        ──► PublicEstablishment { id }              │
//! │        │ absent                                                         │
//! │        ▼                                                                │
//! │   (nothing)                 ──► None  (restore stored session)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Empty values count as absent: `?status=` does not trigger the payment
//! page. The token path does not end the decision; after handling it the
//! router still honours `establishmentId` (see [`BootstrapParams`]).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Payment Outcome
// =============================================================================

/// Result reported by the payment gateway redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success,
    Cancelled,
}

impl PaymentOutcome {
    /// `success` is approved; any other status value is treated as cancelled.
    pub fn from_status(status: &str) -> Self {
        if status == "success" {
            PaymentOutcome::Success
        } else {
            PaymentOutcome::Cancelled
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => "Payment approved!",
            PaymentOutcome::Cancelled => "Payment cancelled!",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PaymentOutcome::Success => {
                "Your payment was approved. You will be redirected shortly."
            }
            PaymentOutcome::Cancelled => {
                "The payment was cancelled. You will be redirected shortly."
            }
        }
    }
}

// =============================================================================
// Query Parameters
// =============================================================================

/// The four query parameters bootstrap cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapParams {
    pub status: Option<String>,
    pub token: Option<String>,
    pub plano: Option<String>,
    pub establishment_id: Option<String>,
}

impl BootstrapParams {
    /// Builds params from decoded `(key, value)` query pairs.
    ///
    /// Unknown keys are ignored; for repeated keys the first value wins,
    /// matching `URLSearchParams.get`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = BootstrapParams::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref() {
                "status" => &mut params.status,
                "token" => &mut params.token,
                "plano" => &mut params.plano,
                "establishmentId" => &mut params.establishment_id,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
        params
    }

    /// Classifies the params into the highest-priority signal.
    pub fn signal(&self) -> BootstrapSignal {
        if let Some(status) = &self.status {
            return BootstrapSignal::PaymentStatus(PaymentOutcome::from_status(status));
        }
        if let (Some(token), Some(plano)) = (&self.token, &self.plano) {
            return BootstrapSignal::AuthToken {
                token: token.clone(),
                plan_flag: plano.clone(),
            };
        }
        if let Some(id) = &self.establishment_id {
            return BootstrapSignal::PublicEstablishment {
                establishment_id: id.clone(),
            };
        }
        BootstrapSignal::None
    }

    /// True when the visible URL carries auth material that must be stripped.
    pub fn carries_token(&self) -> bool {
        self.token.is_some() && self.plano.is_some()
    }
}

// =============================================================================
// Bootstrap Signal
// =============================================================================

/// What the URL asks for at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapSignal {
    PaymentStatus(PaymentOutcome),
    AuthToken { token: String, plan_flag: String },
    PublicEstablishment { establishment_id: String },
    None,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BootstrapParams {
        BootstrapParams::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_status_wins_over_everything() {
        let p = params(&[
            ("establishmentId", "5"),
            ("token", "a.b.c"),
            ("plano", "1"),
            ("status", "success"),
        ]);
        assert_eq!(
            p.signal(),
            BootstrapSignal::PaymentStatus(PaymentOutcome::Success)
        );
    }

    #[test]
    fn test_unknown_status_is_cancelled() {
        let p = params(&[("status", "failure")]);
        assert_eq!(
            p.signal(),
            BootstrapSignal::PaymentStatus(PaymentOutcome::Cancelled)
        );
        assert_eq!(PaymentOutcome::Cancelled.title(), "Payment cancelled!");
    }

    #[test]
    fn test_token_requires_plano() {
        let p = params(&[("token", "a.b.c"), ("establishmentId", "5")]);
        assert_eq!(
            p.signal(),
            BootstrapSignal::PublicEstablishment {
                establishment_id: "5".into()
            }
        );
        assert!(!p.carries_token());

        let p = params(&[("token", "a.b.c"), ("plano", "pro")]);
        assert_eq!(
            p.signal(),
            BootstrapSignal::AuthToken {
                token: "a.b.c".into(),
                plan_flag: "pro".into()
            }
        );
    }

    #[test]
    fn test_empty_values_are_absent() {
        let p = params(&[("status", ""), ("establishmentId", "")]);
        assert_eq!(p.signal(), BootstrapSignal::None);
    }

    #[test]
    fn test_first_value_wins_and_unknown_keys_ignored() {
        let p = params(&[
            ("establishmentId", "1"),
            ("establishmentId", "2"),
            ("utm_source", "mail"),
        ]);
        assert_eq!(p.establishment_id.as_deref(), Some("1"));
    }
}
