/*
 * Responsibility
 * - POST /authorize: raw body をそのまま gate に渡し、gate の response を返す
 * - POST /invoke: gateway proxy event から body を取り出し、結果を proxy 形式で返す
 * - status code の決定はしない (services::gate::response に任せる)
 */
use axum::{Json, body::Bytes, extract::State};

use crate::api::v1::dto::proxy_event::{ProxyRequestEvent, ProxyResponseEvent};
use crate::services::gate::{AuthorizationRequest, AuthorizationResponse, response};
use crate::state::AppState;

pub async fn authorize(State(state): State<AppState>, body: Bytes) -> AuthorizationResponse {
    let req = AuthorizationRequest::new(body_text(&body));
    response::build(state.gate.authorize(&req))
}

pub async fn invoke(State(state): State<AppState>, body: Bytes) -> Json<ProxyResponseEvent> {
    // A missing or unreadable event is handled like an event without a body.
    let event = serde_json::from_slice::<Option<ProxyRequestEvent>>(&body)
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "unreadable proxy event");
            None
        })
        .unwrap_or_default();

    let req = AuthorizationRequest::new(event.body);
    let res = response::build(state.gate.authorize(&req));

    Json(res.into())
}

fn body_text(body: &Bytes) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    // Non UTF-8 input ends up as invalid JSON downstream.
    Some(String::from_utf8_lossy(body).into_owned())
}
