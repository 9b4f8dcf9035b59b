//! The decision pipeline: request body in, [`AuthorizationOutcome`] out.
//!
//! Checks run strictly in order and the first failure wins:
//! configuration → body → JSON → idToken → claims → email → domain → allowlist.
//!
//! The pipeline is synchronous and has no side effects besides logging.
//! Token signatures are NOT verified (see [`super::claims`]).

use serde::Deserialize;
use serde_json::Value;

use super::allowlist::DomainAllowlist;
use super::claims::{self, TokenClaims};
use super::domain::domain_of;
use crate::error::{BadRequestReason, GateError};

/// Raw request as handed over by the transport.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRequest {
    body: Option<String>,
}

impl AuthorizationRequest {
    pub fn new(body: Option<String>) -> Self {
        Self { body }
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Allowed,
    Denied,
    BadRequest(BadRequestReason),
    ConfigurationError,
}

impl From<GateError> for AuthorizationOutcome {
    fn from(e: GateError) -> Self {
        match e {
            GateError::Configuration => Self::ConfigurationError,
            GateError::BadRequest(reason) => Self::BadRequest(reason),
        }
    }
}

/// What to do with tokens whose `email_verified` claim is not `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerifiedEmailPolicy {
    /// Use the email anyway (logged as a warning).
    #[default]
    Accept,
    /// Treat the token as carrying no usable email.
    Require,
}

/// Request body schema. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct IdTokenRequest {
    #[serde(rename = "idToken")]
    id_token: Option<IdTokenValue>,
}

/// Scalars are read as text and left for the token decoder to reject;
/// objects and arrays do not deserialize at all.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdTokenValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl IdTokenValue {
    fn into_text(self) -> String {
        match self {
            IdTokenValue::Text(s) => s,
            IdTokenValue::Number(n) => n.to_string(),
            IdTokenValue::Flag(b) => b.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct DecisionPipeline {
    allowlist: DomainAllowlist,
    email_policy: VerifiedEmailPolicy,
}

impl DecisionPipeline {
    pub fn new(allowlist: DomainAllowlist, email_policy: VerifiedEmailPolicy) -> Self {
        Self {
            allowlist,
            email_policy,
        }
    }

    pub fn authorize(&self, req: &AuthorizationRequest) -> AuthorizationOutcome {
        match self.decide(req) {
            Ok(true) => AuthorizationOutcome::Allowed,
            Ok(false) => AuthorizationOutcome::Denied,
            Err(GateError::Configuration) => {
                tracing::error!("allowed email domains are not configured or hold no domain");
                AuthorizationOutcome::ConfigurationError
            }
            Err(err) => {
                tracing::warn!(error = %err, "request rejected");
                err.into()
            }
        }
    }

    fn decide(&self, req: &AuthorizationRequest) -> Result<bool, GateError> {
        let allowed = self.allowlist.get().ok_or(GateError::Configuration)?;

        let body = req
            .body()
            .filter(|b| !b.trim().is_empty())
            .ok_or(BadRequestReason::MissingBody)?;
        tracing::debug!(body_len = body.len(), "request body received");

        let token = parse_id_token(body)?;
        let claims = claims::extract(token.trim())?;

        let email = self
            .usable_email(&claims)
            .ok_or(BadRequestReason::NoEmailInToken)?;
        let domain = domain_of(email).ok_or(BadRequestReason::MalformedEmail)?;

        if allowed.is_allowed(domain) {
            tracing::info!(domain, "email domain allowed");
            Ok(true)
        } else {
            tracing::warn!(domain, allowed = %allowed, "email domain not in allowlist");
            Ok(false)
        }
    }

    fn usable_email<'a>(&self, claims: &'a TokenClaims) -> Option<&'a str> {
        let email = claims.email.as_deref().filter(|e| !e.trim().is_empty())?;

        if !claims.is_email_verified() {
            match self.email_policy {
                VerifiedEmailPolicy::Accept => {
                    tracing::warn!(email, "email claim present but email_verified is not true");
                }
                VerifiedEmailPolicy::Require => {
                    tracing::warn!(email, "unverified email rejected by policy");
                    return None;
                }
            }
        }

        Some(email)
    }
}

/// Extract a non-blank `idToken` from the body.
///
/// Only a JSON object (or a bare `null`, read as an empty object) is accepted.
fn parse_id_token(body: &str) -> Result<String, BadRequestReason> {
    let value: Value = serde_json::from_str(body).map_err(|_| BadRequestReason::InvalidJson)?;
    if !(value.is_object() || value.is_null()) {
        return Err(BadRequestReason::InvalidJson);
    }

    let req: Option<IdTokenRequest> =
        serde_json::from_value(value).map_err(|_| BadRequestReason::InvalidJson)?;

    req.and_then(|r| r.id_token)
        .map(IdTokenValue::into_text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(BadRequestReason::MissingIdToken)
}
