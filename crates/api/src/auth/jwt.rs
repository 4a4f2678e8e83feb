//! Verification of RS256 access tokens minted by the identity provider.
//!
//! The token header names its signing key (`kid`); the key is looked up in
//! the provider's published key set, the signature is checked, and then
//! `exp`, `aud` and `iss` are validated. The result is the full claim map.

use std::str::FromStr;
use std::sync::Arc;

use aviary_core::claims::Claims;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use super::jwks::{find_key, KeySource};
use super::AuthError;

/// Configuration for bearer-token verification.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Identity-provider domain, e.g. `example.eu.auth0.com`.
    pub domain: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Accepted signing algorithms.
    pub algorithms: Vec<Algorithm>,
    /// Where the signing keys are published.
    pub jwks_url: String,
    /// How long a fetched key set stays fresh (`0` refetches every time).
    pub jwks_cache_ttl_secs: u64,
    /// Minimum seconds between refetches forced by an unknown `kid`.
    pub jwks_min_refresh_secs: u64,
    /// Clock-skew allowance applied to `exp`.
    pub leeway_secs: u64,
}

/// Default key-set cache lifetime in seconds.
const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 600;
/// Default spacing between forced key-set refetches in seconds.
const DEFAULT_JWKS_MIN_REFRESH_SECS: u64 = 30;
/// Default clock-skew leeway in seconds.
const DEFAULT_LEEWAY_SECS: u64 = 60;

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default                                  |
    /// |-------------------------|----------|------------------------------------------|
    /// | `AUTH0_DOMAIN`          | **yes**  | --                                       |
    /// | `API_AUDIENCE`          | **yes**  | --                                       |
    /// | `ALGORITHMS`            | no       | `RS256`                                  |
    /// | `JWKS_URL`              | no       | `https://<domain>/.well-known/jwks.json` |
    /// | `JWKS_CACHE_TTL_SECS`   | no       | `600`                                    |
    /// | `JWKS_MIN_REFRESH_SECS` | no       | `30`                                     |
    /// | `JWT_LEEWAY_SECS`       | no       | `60`                                     |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or empty, or if `ALGORITHMS`
    /// names an unknown algorithm.
    pub fn from_env() -> Self {
        let domain =
            std::env::var("AUTH0_DOMAIN").expect("AUTH0_DOMAIN must be set in the environment");
        assert!(!domain.trim().is_empty(), "AUTH0_DOMAIN must not be empty");

        let audience =
            std::env::var("API_AUDIENCE").expect("API_AUDIENCE must be set in the environment");
        assert!(!audience.trim().is_empty(), "API_AUDIENCE must not be empty");

        let algorithms: Vec<Algorithm> = std::env::var("ALGORITHMS")
            .unwrap_or_else(|_| "RS256".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Algorithm::from_str(s).unwrap_or_else(|_| panic!("Unknown JWT algorithm '{s}'"))
            })
            .collect();
        assert!(!algorithms.is_empty(), "ALGORITHMS must name at least one algorithm");

        let jwks_url = std::env::var("JWKS_URL")
            .unwrap_or_else(|_| format!("https://{domain}/.well-known/jwks.json"));

        let jwks_cache_ttl_secs: u64 = std::env::var("JWKS_CACHE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_JWKS_CACHE_TTL_SECS.to_string())
            .parse()
            .expect("JWKS_CACHE_TTL_SECS must be a valid u64");

        let jwks_min_refresh_secs: u64 = std::env::var("JWKS_MIN_REFRESH_SECS")
            .unwrap_or_else(|_| DEFAULT_JWKS_MIN_REFRESH_SECS.to_string())
            .parse()
            .expect("JWKS_MIN_REFRESH_SECS must be a valid u64");

        let leeway_secs: u64 = std::env::var("JWT_LEEWAY_SECS")
            .unwrap_or_else(|_| DEFAULT_LEEWAY_SECS.to_string())
            .parse()
            .expect("JWT_LEEWAY_SECS must be a valid u64");

        Self {
            domain,
            audience,
            algorithms,
            jwks_url,
            jwks_cache_ttl_secs,
            jwks_min_refresh_secs,
            leeway_secs,
        }
    }

    /// Expected `iss` claim: `https://<domain>/`.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }
}

/// Verifies bearer tokens against the keys served by a [`KeySource`].
pub struct TokenVerifier {
    keys: Arc<dyn KeySource>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig, keys: Arc<dyn KeySource>) -> Self {
        let mut validation = Validation::default();
        validation.algorithms = config.algorithms.clone();
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_issuer(&[config.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation.leeway = config.leeway_secs;

        Self { keys, validation }
    }

    /// Verify `token` and return its claims.
    ///
    /// | Failure                                 | Code            | Status |
    /// |-----------------------------------------|-----------------|--------|
    /// | token header cannot be decoded          | `invalid_token` | 401    |
    /// | no `kid` in the header                  | `invalid_header`| 401    |
    /// | key set unavailable                     | `invalid_token` | 401    |
    /// | no key matches `kid`                    | `invalid_header`| 401    |
    /// | matching key cannot be used             | `invalid_token` | 401    |
    /// | expired                                 | `token_expired` | 401    |
    /// | wrong audience or issuer                | `invalid_claims`| 401    |
    /// | bad signature, algorithm or payload     | `invalid_header`| 400    |
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Undecodable token header");
            AuthError::invalid_token()
        })?;
        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| AuthError::malformed_header("authorization malformed"))?;

        let key = self.decoding_key(kid).await?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(classify_jwt_error)?;
        Ok(data.claims)
    }

    /// Resolve `kid` to a decoding key, refreshing the key set once on a
    /// miss so rotated keys are picked up.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let set = self.keys.key_set().await.map_err(key_source_failure)?;
        let jwk = match find_key(&set, kid) {
            Some(jwk) => jwk.clone(),
            None => {
                let refreshed = self.keys.refresh().await.map_err(key_source_failure)?;
                find_key(&refreshed, kid).cloned().ok_or_else(|| {
                    tracing::debug!(kid, "No signing key matches token");
                    AuthError::malformed_header("unable to find appropriate key")
                })?
            }
        };

        DecodingKey::from_jwk(&jwk).map_err(|e| {
            tracing::warn!(kid, error = %e, "Unusable signing key in key set");
            AuthError::invalid_token()
        })
    }
}

fn key_source_failure(err: super::jwks::KeySourceError) -> AuthError {
    tracing::error!(error = %err, "Unable to load signing keys");
    AuthError::invalid_token()
}

/// Map a `jsonwebtoken` validation failure to the client-facing error.
fn classify_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::expired(),
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::ImmatureSignature => {
            AuthError::invalid_claims()
        }
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
            AuthError::invalid_claims()
        }
        _ => {
            tracing::debug!(error = %err, "Token failed verification");
            AuthError::unparseable_token()
        }
    }
}
