//! # Session Token Payload
//!
//! Reads the claims carried in the middle segment of a three-part session
//! token (`header.payload.signature`) without verifying the signature.
//!
//! ## Why Unverified?
//! The client only uses the claims to decide which view to show after a
//! payment or login redirect. Every authenticated API call sends the raw
//! token, and the server is the one that rejects a forged one.
//!
//! ## Accepted Payload
//! ```json
//! { "id": 12, "role": "establishment", "email": "owner@shop.test",
//!   "planoAtivo": true, "dataExpiracaoPlano": "2024-12-31" }
//! ```
//! `planActive` / `planExpiresAt` are accepted as well. `role` and the plan
//! flag are required. `id`, `email` and the expiry may be missing: a token
//! issued to an employee carries no establishment id.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::error::DecodeError;
use crate::types::{flex, Role, Session};

// =============================================================================
// Claims
// =============================================================================

/// Claims read from the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    /// Account identifier (the establishment id for owner accounts).
    #[serde(default, deserialize_with = "flex::option_string_or_number")]
    pub id: Option<String>,

    pub role: Role,

    #[serde(default)]
    pub email: String,

    #[serde(alias = "planoAtivo")]
    pub plan_active: bool,

    #[serde(
        default,
        alias = "dataExpiracaoPlano",
        deserialize_with = "flex::option_string_or_number"
    )]
    pub plan_expires_at: Option<String>,
}

impl TokenClaims {
    /// Builds the session a token redirect establishes.
    ///
    /// The `id` claim, when present, becomes the session's establishment id.
    pub fn into_session(self, token: impl Into<String>) -> Session {
        Session {
            token: token.into(),
            role: self.role,
            establishment_id: self.id,
            email: self.email,
            plan_active: self.plan_active,
            plan_expires_at: self.plan_expires_at,
        }
    }
}

/// Outcome of reading a token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDecode {
    Decoded(TokenClaims),
    Malformed(DecodeError),
}

impl TokenDecode {
    pub fn into_result(self) -> Result<TokenClaims, DecodeError> {
        match self {
            TokenDecode::Decoded(claims) => Ok(claims),
            TokenDecode::Malformed(err) => Err(err),
        }
    }

    pub fn claims(&self) -> Option<&TokenClaims> {
        match self {
            TokenDecode::Decoded(claims) => Some(claims),
            TokenDecode::Malformed(_) => None,
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes the payload segment of `token`.
///
/// Both base64 alphabets are accepted, with or without padding.
pub fn decode_token(token: &str) -> TokenDecode {
    match decode_claims(token) {
        Ok(claims) => TokenDecode::Decoded(claims),
        Err(err) => TokenDecode::Malformed(err),
    }
}

fn decode_claims(token: &str) -> Result<TokenClaims, DecodeError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::SegmentCount(segments.len()));
    }

    let normalized: String = segments[1]
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))
}

impl Session {
    /// The `id` claim of this session's token, if it can be read.
    ///
    /// Employee accounts use it to address their own appointment list.
    pub fn subject_id(&self) -> Option<String> {
        decode_token(&self.token)
            .claims()
            .and_then(|c| c.id.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
