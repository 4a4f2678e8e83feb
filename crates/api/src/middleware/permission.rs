//! Permission gate middleware.
//!
//! Each protected route gets its own layer:
//!
//! ```ignore
//! get(birds::list).route_layer(middleware::from_fn_with_state(
//!     PermissionGate::new(&state, permissions::GET_BIRDS),
//!     require_permission,
//! ))
//! ```
//!
//! On success the verified [`Claims`] are stored in the request extensions,
//! where handlers read them with `Extension<Claims>`.

use std::sync::Arc;

use aviary_core::claims::Claims;
use aviary_core::permissions::authorize;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::header::bearer_token;
use crate::auth::jwt::TokenVerifier;
use crate::error::AppError;
use crate::state::AppState;

/// The verifier plus the single permission a route requires.
#[derive(Clone)]
pub struct PermissionGate {
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
}

impl PermissionGate {
    pub fn new(state: &AppState, permission: &'static str) -> Self {
        Self {
            verifier: Arc::clone(&state.verifier),
            permission,
        }
    }

    pub fn permission(&self) -> &'static str {
        self.permission
    }

    /// Verify `token` and check the permission, returning the claims.
    async fn check(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.verifier.verify(token).await.inspect_err(|e| {
            tracing::debug!(code = e.code, "Rejected bearer token");
        })?;

        authorize(self.permission, &claims).inspect_err(|e| {
            tracing::debug!(
                permission = self.permission,
                sub = claims.subject().unwrap_or("-"),
                error = %e,
                "Permission denied"
            );
        })?;

        Ok(claims)
    }
}

/// Reject the request unless it carries a valid token granting the gate's
/// permission.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Request bodies are not `Sync`: no borrow of the request may live across `.await`.
    let token = request_token(&request)?;
    let claims = gate.check(&token).await?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn request_token(request: &Request) -> Result<String, AppError> {
    let token = bearer_token(request.headers()).inspect_err(|e| {
        tracing::debug!(code = e.code, "Rejected authorization header");
    })?;
    Ok(token.to_owned())
}
