//! Bearer-token authentication.
//!
//! - [`header`] -- Extracts the raw token from the `Authorization` header.
//! - [`jwks`] -- Key sources serving the identity provider's signing keys.
//! - [`jwt`] -- Signature and standard-claim verification.

pub mod header;
pub mod jwks;
pub mod jwt;

use axum::http::StatusCode;

/// An authentication failure, reported to the client as
/// `{code, message}` with its own HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    /// Stable machine-readable failure code, e.g. `token_expired`.
    pub code: &'static str,
    pub description: String,
    pub status: StatusCode,
}

impl AuthError {
    pub const HEADER_MISSING: &'static str = "authorization_header_missing";
    pub const INVALID_HEADER: &'static str = "invalid_header";
    pub const TOKEN_EXPIRED: &'static str = "token_expired";
    pub const INVALID_CLAIMS: &'static str = "invalid_claims";
    pub const INVALID_TOKEN: &'static str = "invalid_token";

    fn new(code: &'static str, description: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code,
            description: description.into(),
            status,
        }
    }

    pub fn header_missing() -> Self {
        Self::new(
            Self::HEADER_MISSING,
            "authorization header is expected",
            StatusCode::UNAUTHORIZED,
        )
    }

    /// Malformed `Authorization` header or token header (401).
    pub fn malformed_header(description: impl Into<String>) -> Self {
        Self::new(Self::INVALID_HEADER, description, StatusCode::UNAUTHORIZED)
    }

    /// The token could be located but not parsed or verified (400).
    pub fn unparseable_token() -> Self {
        Self::new(
            Self::INVALID_HEADER,
            "unable to parse authentication token",
            StatusCode::BAD_REQUEST,
        )
    }

    pub fn expired() -> Self {
        Self::new(
            Self::TOKEN_EXPIRED,
            "token expired",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub fn invalid_claims() -> Self {
        Self::new(
            Self::INVALID_CLAIMS,
            "incorrect claims, please check the audience and issuer",
            StatusCode::UNAUTHORIZED,
        )
    }

    /// Catch-all for failures outside the token itself (key-set retrieval,
    /// undecodable token header).
    pub fn invalid_token() -> Self {
        Self::new(
            Self::INVALID_TOKEN,
            "unable to decode token",
            StatusCode::UNAUTHORIZED,
        )
    }
}
