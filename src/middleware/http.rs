//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id)
//! - Access logging / request tracing (TraceLayer)
//! - Body size limits
//! - Global timeouts
//! - JSON `{"error": ...}` bodies for transport-level failures (408, 413, 404, ...)
//!
//! The gate itself never blocks; the timeout only bounds slow clients.

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderMap, StatusCode, header, header::HeaderName};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, middleware};
use serde_json::json;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

/// Apply HTTP-level middleware to the given Router.
///
/// Body limit and timeout come from `Config` (defaults: 1 MiB, 30 seconds).
pub fn apply(router: Router, config: &Config) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let layers = ServiceBuilder::new()
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(config.request_body_limit_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http());

    router
        .layer(layers)
        .layer(middleware::map_response(json_error_body))
}

/// Replace the plain-text or empty body of an error response with the gate's
/// `{"error": ...}` shape. Responses that already carry JSON pass through.
async fn json_error_body(res: Response) -> Response {
    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(res.headers()) {
        return res;
    }

    let (mut parts, _) = res.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);
    tracing::debug!(%status, "transport error rewritten as JSON");

    (parts, Json(json!({ "error": error_message(status) }))).into_response()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"))
}

fn error_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::REQUEST_TIMEOUT => "Request timed out.",
        StatusCode::PAYLOAD_TOO_LARGE => "Request body is too large.",
        _ => status.canonical_reason().unwrap_or("Request failed."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
        routing::get,
    };
    use tower::ServiceExt;

    use crate::config::AppEnv;
    use crate::services::gate::VerifiedEmailPolicy;

    fn config(timeout_seconds: u64) -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            email_policy: VerifiedEmailPolicy::Accept,
            request_timeout_seconds: timeout_seconds,
            request_body_limit_bytes: 1024,
        }
    }

    async fn error_of(res: Response) -> (StatusCode, serde_json::Value) {
        let status = res.status();
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn timeout_answers_408_with_json() {
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "late"
            }),
        );

        let res = apply(router, &config(1))
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let (status, body) = error_of(res).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["error"], "Request timed out.");
    }

    #[tokio::test]
    async fn unknown_route_answers_404_with_json() {
        let res = apply(Router::new(), &config(5))
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let (status, body) = error_of(res).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn json_error_bodies_pass_through() {
        let original = (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Access denied. Email domain not authorized." })),
        )
            .into_response();

        let (status, body) = error_of(json_error_body(original).await).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Access denied. Email domain not authorized.");
    }

    #[tokio::test]
    async fn plain_text_errors_are_rewritten() {
        let original = (StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded").into_response();

        let (status, body) = error_of(json_error_body(original).await).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Request body is too large.");
    }

    #[tokio::test]
    async fn successes_are_untouched() {
        let original = (StatusCode::OK, "fine").into_response();
        let res = json_error_body(original).await;

        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"fine");
    }
}
