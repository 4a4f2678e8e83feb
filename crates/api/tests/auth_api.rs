//! HTTP-level integration tests for bearer-token authentication and the
//! per-route permission gates.

mod common;

use aviary_core::permissions::{DELETE_BIRDS, GET_BIRDS, GET_HABITATS, POST_HABITATS};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{
    base_claims, body_json, get, get_auth, mint_token, post_json_auth, sign, token_with,
    FOREIGN_KEY, KID, SIGNING_KEY,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn get_with_header(pool: PgPool, uri: &str, authorization: &str) -> axum::response::Response {
    let app = common::build_test_app(pool);
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Authorization header
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_header_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/birds").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], 401);
    assert_eq!(json["code"], "authorization_header_missing");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_bearer_scheme_is_401(pool: PgPool) {
    let response = get_with_header(pool, "/birds", "Basic dXNlcjpwYXNz").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "invalid_header");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bearer_without_token_is_401(pool: PgPool) {
    let response = get_with_header(pool, "/birds", "Bearer").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "invalid_header");
    assert_eq!(json["message"], "token not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lowercase_scheme_is_accepted(pool: PgPool) {
    let token = token_with(&[GET_BIRDS]);
    let response = get_with_header(pool, "/birds", &format!("bearer {token}")).await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Token verification
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_token_is_401(pool: PgPool) {
    let mut claims = base_claims();
    claims["permissions"] = json!([GET_BIRDS]);
    claims["exp"] = json!(chrono::Utc::now().timestamp() - 3600);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/birds", &mint_token(&claims)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "token_expired");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_audience_is_401(pool: PgPool) {
    let mut claims = base_claims();
    claims["permissions"] = json!([GET_BIRDS]);
    claims["aud"] = json!("another-api");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/birds", &mint_token(&claims)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "invalid_claims");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn foreign_signature_is_400(pool: PgPool) {
    let mut claims = base_claims();
    claims["permissions"] = json!([GET_BIRDS]);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/birds", &sign(&claims, Some(KID), FOREIGN_KEY)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "invalid_header");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_key_id_is_401(pool: PgPool) {
    let mut claims = base_claims();
    claims["permissions"] = json!([GET_BIRDS]);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/birds", &sign(&claims, Some("retired-key"), SIGNING_KEY)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "invalid_header");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/birds", "definitely.not.a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "invalid_token");
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn token_without_permissions_claim_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/birds", &mint_token(&base_claims())).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], 400);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_permission_is_403(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/habitats", &token_with(&[GET_BIRDS])).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], 403);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn granted_permission_succeeds(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/habitats", &token_with(&[GET_HABITATS])).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn each_verb_checks_its_own_permission(pool: PgPool) {
    let read_only = token_with(&[GET_BIRDS]);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/birds/1", &read_only).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = common::delete_auth(app, "/birds/1", &read_only).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = common::delete_auth(app, "/birds/1", &token_with(&[DELETE_BIRDS])).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn habitat_search_needs_post_permission(pool: PgPool) {
    let body = json!({"search": "a"});

    let app = common::build_test_app(pool.clone());
    let read_only = token_with(&[GET_HABITATS]);
    let response = post_json_auth(app, "/habitats", body.clone(), &read_only).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/habitats", body, &token_with(&[POST_HABITATS])).await;
    assert_eq!(response.status(), StatusCode::OK);
}
