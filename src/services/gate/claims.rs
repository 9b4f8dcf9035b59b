//! ID token claim extraction.
//!
//! WARNING: this module does NOT verify the token signature.
//!
//! The header and payload segments are base64url-decoded and parsed as JSON,
//! nothing more.
//! Anyone can mint a token that passes here, so the gate is only as trustworthy
//! as whatever sits in front of it. If the caller cannot guarantee the token was
//! verified upstream, add verification against the issuer's JWKS before the gate.

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::Value;

// Tokens normally come unpadded, but some clients pad the segments anyway.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum TokenDecodeError {
    #[error("expected 3 token segments, got {0}")]
    SegmentCount(usize),
    #[error("segment is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("segment is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token header is not a JSON object")]
    HeaderNotObject,
}

/// Claims the gate cares about. Missing and wrongly-typed claims are both `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenClaims {
    pub email: Option<String>,
    pub email_verified: Option<bool>,
}

impl TokenClaims {
    pub fn is_email_verified(&self) -> bool {
        self.email_verified == Some(true)
    }
}

/// Decode the payload of `header.payload.signature` without verifying anything.
///
/// The header must still be a base64url JSON object; the signature is ignored.
pub fn extract(token: &str) -> Result<TokenClaims, TokenDecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, _signature] = segments.as_slice() else {
        return Err(TokenDecodeError::SegmentCount(segments.len()));
    };

    if !decode_segment(header)?.is_object() {
        return Err(TokenDecodeError::HeaderNotObject);
    }
    let payload = decode_segment(payload)?;

    Ok(TokenClaims {
        email: payload
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_owned),
        email_verified: payload.get("email_verified").and_then(Value::as_bool),
    })
}

fn decode_segment(segment: &str) -> Result<Value, TokenDecodeError> {
    let bytes = SEGMENT_ENGINE.decode(segment)?;
    Ok(serde_json::from_slice(&bytes)?)
}
