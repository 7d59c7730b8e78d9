use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;
use uuid::Uuid;

use crate::{auth::jwt::TokenCodec, error::ApiError, state::AppState};

/// Paths reachable without a token. Everything else is protected.
pub const PUBLIC_PATHS: &[&str] = &["/auth/signup", "/auth/login", "/health"];

/// Verified identity attached to the request by the gateway. Set exactly
/// once here and read-only downstream; handlers must never derive identity
/// from a request body or a client-settable header.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Runs before every handler. Rejects missing/malformed/invalid bearer
/// tokens with 401 without invoking any downstream logic; on success
/// forwards the request with `Identity` in its extensions.
pub async fn auth_gateway(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if PUBLIC_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let Some(header) = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return ApiError::Unauthorized("missing Authorization header").into_response();
    };

    let Some(token) = header.strip_prefix("Bearer ") else {
        return ApiError::Unauthorized("invalid Authorization header").into_response();
    };

    let codec = TokenCodec::from_ref(&state);
    match codec.verify(token) {
        Ok(claims) => {
            req.extensions_mut().insert(Identity {
                user_id: claims.sub,
                email: claims.email,
            });
            next.run(req).await
        }
        Err(e) => {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthorized("invalid or expired token").into_response()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(ApiError::Unauthorized("unauthenticated"))
    }
}
