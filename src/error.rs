/*
 * Responsibility
 * - gate 内のエラー分類 (ConfigurationFault / ClientInputFault)
 * - 下位モジュールのエラー (TokenDecodeError など) を分類済みのエラーに変換
 * - HTTP status / body の決定はしない (services::gate::response の責務)
 */
use thiserror::Error;

use crate::services::gate::claims::TokenDecodeError;

/// Why a request was rejected as client input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BadRequestReason {
    #[error("missing body")]
    MissingBody,
    #[error("invalid JSON")]
    InvalidJson,
    #[error("missing idToken")]
    MissingIdToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("no email in token")]
    NoEmailInToken,
    #[error("malformed email")]
    MalformedEmail,
}

#[derive(Debug, Error)]
pub enum GateError {
    // Fatal for the request only; the next request retries the load.
    #[error("allowed email domains not configured")]
    Configuration,
    #[error("bad request: {0}")]
    BadRequest(BadRequestReason),
}

impl From<BadRequestReason> for GateError {
    fn from(reason: BadRequestReason) -> Self {
        GateError::BadRequest(reason)
    }
}

impl From<TokenDecodeError> for GateError {
    fn from(_: TokenDecodeError) -> Self {
        GateError::BadRequest(BadRequestReason::InvalidToken)
    }
}
