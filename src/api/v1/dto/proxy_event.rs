/*
 * Responsibility
 * - gateway proxy 形式の request/response DTO
 * - request は body だけ読む (他のフィールドは無視)
 */
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::services::gate::AuthorizationResponse;

/// Incoming proxy event. Only `body` is read.
#[derive(Debug, Default, Deserialize)]
pub struct ProxyRequestEvent {
    #[serde(default)]
    pub body: Option<String>,
}

/// Outgoing proxy result: the gate response folded into JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponseEvent {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<AuthorizationResponse> for ProxyResponseEvent {
    fn from(res: AuthorizationResponse) -> Self {
        Self {
            status_code: res.status.as_u16(),
            headers: res.header_map(),
            body: res.body,
        }
    }
}
