//! Sources of the identity provider's JSON Web Key Set.
//!
//! [`RemoteJwks`] fetches the published set over HTTPS and caches it
//! process-wide for a configurable TTL. [`StaticJwks`] serves a fixed set
//! and is used by tests and offline deployments.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::RwLock;

/// Failure to obtain a key set.
#[derive(Debug, thiserror::Error)]
pub enum KeySourceError {
    #[error("key set request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Provides the current set of trusted signing keys.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// The current key set, possibly served from a cache.
    async fn key_set(&self) -> Result<JwkSet, KeySourceError>;

    /// Reload the key set, bypassing the freshness TTL. Called once when a
    /// token names a key the current set does not contain. Implementations
    /// may rate-limit reloads.
    async fn refresh(&self) -> Result<JwkSet, KeySourceError> {
        self.key_set().await
    }
}

/// Look up the key with the given `kid`.
pub fn find_key<'a>(set: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    set.keys
        .iter()
        .find(|key| key.common.key_id.as_deref() == Some(kid))
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// Default minimum spacing between forced refreshes.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Key set fetched from a JWKS endpoint and cached for `ttl`.
///
/// A zero TTL disables caching: every call goes to the network.
/// [`KeySource::refresh`] reuses the cached set when it was fetched less
/// than `min_refresh_interval` ago, so tokens naming unknown keys cannot
/// force a fetch per request.
#[derive(Debug)]
pub struct RemoteJwks {
    client: reqwest::Client,
    url: String,
    ttl: Duration,
    min_refresh_interval: Duration,
    cache: RwLock<Option<CachedJwks>>,
}

impl RemoteJwks {
    pub fn new(url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            ttl,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            cache: RwLock::new(None),
        }
    }

    /// Set the minimum age of the cached set before `refresh` refetches it.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The cached set if it is younger than `max_age`.
    async fn cached_within(&self, max_age: Duration) -> Option<JwkSet> {
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < max_age)
            .map(|cached| cached.jwks.clone())
    }

    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        let jwks: JwkSet = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        tracing::debug!(url = %self.url, keys = jwks.keys.len(), "Fetched JWKS");

        *self.cache.write().await = Some(CachedJwks {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn key_set(&self) -> Result<JwkSet, KeySourceError> {
        match self.cached_within(self.ttl).await {
            Some(jwks) => Ok(jwks),
            None => self.fetch().await,
        }
    }

    async fn refresh(&self) -> Result<JwkSet, KeySourceError> {
        if let Some(jwks) = self.cached_within(self.min_refresh_interval).await {
            tracing::debug!(url = %self.url, "JWKS refresh throttled, reusing cached set");
            return Ok(jwks);
        }
        self.fetch().await
    }
}

// ---------------------------------------------------------------------------
// Static
// ---------------------------------------------------------------------------

/// A fixed key set.
#[derive(Debug, Clone)]
pub struct StaticJwks(JwkSet);

impl StaticJwks {
    pub fn new(set: JwkSet) -> Self {
        Self(set)
    }

    /// Parse a JWKS document (`{"keys": [...]}`).
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document).map(Self)
    }
}

#[async_trait]
impl KeySource for StaticJwks {
    async fn key_set(&self) -> Result<JwkSet, KeySourceError> {
        Ok(self.0.clone())
    }
}
