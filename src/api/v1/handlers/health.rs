/*
 * Responsibility
 * - GET /health (疎通用)
 * - gate の設定状態には依存しない (allowlist 未設定でも ok を返す)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
