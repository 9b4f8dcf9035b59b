/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (DecisionPipeline) → Router 組み立て
 * - Middleware の適用 (HTTP / CORS / security headers)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::health::health;
use crate::config::{ALLOWED_DOMAINS_VAR, Config, EnvDomainSource};
use crate::middleware;
use crate::services::gate::{DecisionPipeline, DomainAllowlist, DomainSource};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,email_domain_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting email domain gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    tracing::warn!(
        "ID token signatures are NOT verified; put a verifying proxy in front of this gate"
    );
    if EnvDomainSource.load().is_none() {
        // Not fatal: the allowlist is read on first request and retried until set.
        tracing::warn!("{} is not set yet", ALLOWED_DOMAINS_VAR);
    }

    let state = build_state(&config);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}

fn build_state(config: &Config) -> AppState {
    // The allowlist is not loaded here; DomainAllowlist reads it on first use.
    let allowlist = DomainAllowlist::new(EnvDomainSource);
    let gate = DecisionPipeline::new(allowlist, config.email_policy);

    AppState::new(Arc::new(gate))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::config::AppEnv;
    use crate::services::gate::{StaticDomainSource, VerifiedEmailPolicy};

    fn test_config() -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            email_policy: VerifiedEmailPolicy::Accept,
            request_timeout_seconds: 5,
            request_body_limit_bytes: 1024,
        }
    }

    fn test_router() -> Router {
        let allowlist = DomainAllowlist::new(StaticDomainSource(Some("example.com".into())));
        let gate = DecisionPipeline::new(allowlist, VerifiedEmailPolicy::Accept);
        build_router(AppState::new(Arc::new(gate)), &test_config())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let res = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn gate_responses_carry_request_id_and_security_headers() {
        let res = test_router()
            .oneshot(
                Request::post("/api/v1/authorize")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(res.headers().contains_key("x-request-id"));
        assert_eq!(res.headers()["x-content-type-options"], "nosniff");
        assert_eq!(res.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_the_gate() {
        let res = test_router()
            .oneshot(
                Request::post("/api/v1/authorize")
                    .header(header::CONTENT_LENGTH, 4096)
                    .body(Body::from(vec![b'x'; 4096]))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Request body is too large.");
    }
}
