#![allow(dead_code)]

use std::sync::Arc;

use aviary_core::permissions;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use aviary_api::auth::jwks::StaticJwks;
use aviary_api::auth::jwt::{AuthConfig, TokenVerifier};
use aviary_api::config::ServerConfig;
use aviary_api::router::build_app_router;
use aviary_api::state::AppState;

pub const SIGNING_KEY: &str = include_str!("../fixtures/signing_key.pem");
pub const FOREIGN_KEY: &str = include_str!("../fixtures/foreign_key.pem");
pub const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const KID: &str = "test-signing-key";

pub const ISSUER: &str = "https://aviary.test/";
pub const AUDIENCE: &str = "aviary-api";

/// Every permission the API knows about.
pub const ALL_PERMISSIONS: &[&str] = &[
    permissions::GET_BIRDS,
    permissions::POST_BIRDS,
    permissions::PATCH_BIRDS,
    permissions::DELETE_BIRDS,
    permissions::GET_HABITATS,
    permissions::POST_HABITATS,
    permissions::PATCH_HABITATS,
    permissions::DELETE_HABITATS,
    permissions::GET_REGIONS,
];

/// Build a test `ServerConfig` with safe defaults.
///
/// Keys come from the fixture key set, so `jwks_url` is never fetched.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        database_max_connections: 5,
        auth: AuthConfig {
            domain: "aviary.test".to_string(),
            audience: AUDIENCE.to_string(),
            algorithms: vec![Algorithm::RS256],
            jwks_url: "http://127.0.0.1:0/unused".to_string(),
            jwks_cache_ttl_secs: 0,
            jwks_min_refresh_secs: 0,
            leeway_secs: 60,
        },
    }
}

/// Build the full application router, as `main.rs` does, against `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let keys = StaticJwks::from_json(JWKS).expect("fixture JWKS must parse");
    let verifier = Arc::new(TokenVerifier::new(&config.auth, Arc::new(keys)));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        verifier,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Claims accepted by the test verifier, valid for an hour.
pub fn base_claims() -> Value {
    json!({
        "iss": ISSUER,
        "aud": AUDIENCE,
        "sub": "auth0|integration",
        "iat": chrono::Utc::now().timestamp(),
        "exp": chrono::Utc::now().timestamp() + 3600,
    })
}

/// Sign `claims` with `pem`, advertising `kid` in the header.
pub fn sign(claims: &Value, kid: Option<&str>, pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key must parse");
    encode(&header, claims, &key).expect("signing should succeed")
}

/// Sign `claims` with the trusted fixture key.
pub fn mint_token(claims: &Value) -> String {
    sign(claims, Some(KID), SIGNING_KEY)
}

/// A valid token granting exactly `granted`.
pub fn token_with(granted: &[&str]) -> String {
    let mut claims = base_claims();
    claims["permissions"] = json!(granted);
    mint_token(&claims)
}

/// A valid token granting every permission.
pub fn all_permissions_token() -> String {
    token_with(ALL_PERMISSIONS)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Send a request through the router. `token` becomes a bearer header.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
