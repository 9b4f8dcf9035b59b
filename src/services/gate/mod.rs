//! Email domain gate.
//!
//! Decides whether the email inside an ID token belongs to an allowed domain.
//! Tokens are decoded WITHOUT signature verification; see [`claims`].
pub mod allowlist;
pub mod claims;
pub mod domain;
pub mod pipeline;
pub mod response;

pub use allowlist::{DomainAllowlist, DomainSource};
#[cfg(test)]
pub use allowlist::StaticDomainSource;
pub use pipeline::{AuthorizationRequest, DecisionPipeline, VerifiedEmailPolicy};
pub use response::AuthorizationResponse;
