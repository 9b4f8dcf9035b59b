use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::pipeline::AuthorizationOutcome;
use crate::error::BadRequestReason;

/// Final status + headers + body for one gate decision.
#[derive(Debug, Clone)]
pub struct AuthorizationResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl AuthorizationResponse {
    /// Headers as plain strings (`Content-Type` casing), for envelopes that carry them as JSON.
    pub fn header_map(&self) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((canonical_header_name(name.as_str()), value.to_string()))
            })
            .collect()
    }
}

// "content-type" -> "Content-Type"
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Map an outcome onto its fixed status code and JSON body.
pub fn build(outcome: AuthorizationOutcome) -> AuthorizationResponse {
    let (status, body) = match outcome {
        AuthorizationOutcome::Allowed => (
            StatusCode::OK,
            json!({"message": "Authentication successful. Email domain allowed."}),
        ),
        AuthorizationOutcome::Denied => (
            StatusCode::FORBIDDEN,
            json!({"error": "Access denied. Email domain not authorized."}),
        ),
        AuthorizationOutcome::BadRequest(reason) => (
            StatusCode::BAD_REQUEST,
            json!({"error": bad_request_message(reason)}),
        ),
        AuthorizationOutcome::ConfigurationError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Configuration error: Allowed email domains not set."}),
        ),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    tracing::debug!(status = status.as_u16(), %body, "gate response");

    AuthorizationResponse {
        status,
        headers,
        body: body.to_string(),
    }
}

fn bad_request_message(reason: BadRequestReason) -> &'static str {
    match reason {
        BadRequestReason::MissingBody => "Request body is missing or empty.",
        BadRequestReason::InvalidJson => "Invalid JSON format in request body.",
        BadRequestReason::MissingIdToken => "'idToken' not found in request body.",
        // Callers are not told which of the two happened.
        BadRequestReason::InvalidToken | BadRequestReason::NoEmailInToken => {
            "Email not found in ID Token or token is invalid."
        }
        BadRequestReason::MalformedEmail => "Invalid email format.",
    }
}

impl IntoResponse for AuthorizationResponse {
    fn into_response(self) -> Response {
        let mut res = Response::new(Body::from(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}
