/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /authorize (raw body) と /invoke (gateway proxy event) を公開
 */
use axum::{Router, routing::post};

use crate::api::v1::handlers::authorize::{authorize, invoke};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/authorize", post(authorize))
        .route("/invoke", post(invoke))
}
