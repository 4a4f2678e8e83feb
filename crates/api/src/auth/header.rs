//! `Authorization: Bearer <token>` parsing.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use super::AuthError;

/// Return the bearer token carried by `headers`.
///
/// The header must hold exactly two whitespace-separated parts, the first
/// being `bearer` in any case. A token spelled `null` is rejected, since
/// that is what browser clients send when no token is stored.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(AuthError::header_missing)?
        .to_str()
        .map_err(|_| AuthError::malformed_header("authorization header is not valid ASCII"))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or_else(AuthError::header_missing)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::malformed_header(
            "authorization header must start with \"Bearer\"",
        ));
    }

    let token = parts
        .next()
        .ok_or_else(|| AuthError::malformed_header("token not found"))?;
    if parts.next().is_some() {
        return Err(AuthError::malformed_header(
            "authorization header must be bearer token",
        ));
    }
    if token == "null" {
        return Err(AuthError::malformed_header("token is null"));
    }

    Ok(token)
}
