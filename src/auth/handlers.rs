use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MeResponse, MeUser, SignupRequest, SignupResponse},
        gateway::Identity,
        services::{is_valid_email, login_user, signup_user},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Emails are trimmed and lower-cased at the boundary; every lookup and
/// insert below sees the normalized form.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::MissingField("password"));
    }

    let email = normalize_email(&payload.email);
    if !is_valid_email(&email) {
        return Err(ApiError::ValidationFailed("invalid email".into()));
    }

    let (user, token) = signup_user(&state, &email, &payload.password, payload.name.as_deref()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::MissingField("email"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::MissingField("password"));
    }

    let email = normalize_email(&payload.email);
    let (user, token) = login_user(&state, &email, &payload.password).await?;

    Ok(Json(LoginResponse {
        success: true,
        user: user.into(),
        token,
    }))
}

/// Identity comes exclusively from the gateway-verified extension; this
/// handler never re-derives it from anything the client controls.
#[instrument(skip(identity))]
pub async fn get_me(identity: Identity) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user: MeUser {
            id: identity.user_id,
            email: identity.email,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }
}
