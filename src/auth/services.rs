use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        jwt::TokenCodec,
        password::{hash_password, verify_password},
        repo::User,
    },
    error::ApiError,
    state::AppState,
    store::CredentialStore,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn is_unique_violation(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

/// Provision an account: user row, then root folder, then token. The two
/// inserts are not covered by one transaction with the caller-visible
/// contract, so a failed root-folder insert triggers a compensating user
/// delete. The delete is attempted once; if it fails too, the original
/// error is still the one surfaced.
pub async fn signup_user(
    st: &AppState,
    email: &str,
    password: &str,
    name: Option<&str>,
) -> Result<(User, String), ApiError> {
    // Fast-path existence check; the unique index on users.email is the
    // final arbiter under concurrent signups.
    match st.store.find_user_by_email(email).await {
        Ok(Some(_)) => {
            warn!(email = %email, "email already registered");
            return Err(ApiError::DuplicateAccount);
        }
        Ok(None) => {}
        Err(e) => return Err(ApiError::Downstream(e.context("find user by email"))),
    }

    let hash =
        hash_password(password).map_err(|e| ApiError::Downstream(e.context("hash password")))?;

    let user = match st.store.create_user(email, &hash, name).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %email, "signup lost uniqueness race");
            return Err(ApiError::DuplicateAccount);
        }
        Err(e) => return Err(ApiError::Downstream(e.context("create user"))),
    };

    if let Err(e) = st.store.create_root_folder(user.id).await {
        error!(error = ?e, user_id = %user.id, "create root folder failed, rolling back user");
        if let Err(del_err) = st.store.delete_user(user.id).await {
            // The account is now inconsistent; surface the original error
            // and leave the failed compensation in the logs.
            error!(error = ?del_err, user_id = %user.id, "compensating user delete failed");
        }
        return Err(ApiError::Downstream(e.context("create root folder")));
    }

    let codec = TokenCodec::from_ref(st);
    let token = codec
        .issue(user.id, &user.email)
        .map_err(|e| ApiError::Downstream(e.context("issue token")))?;

    info!(user_id = %user.id, email = %user.email, "user provisioned");
    Ok((user, token))
}

/// Authenticate by email and password. Unknown email and wrong password
/// both yield the same `invalid_credentials` so callers cannot enumerate
/// accounts.
pub async fn login_user(
    st: &AppState,
    email: &str,
    password: &str,
) -> Result<(User, String), ApiError> {
    let user = match st.store.find_user_by_email(email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(ApiError::Downstream(e.context("find user by email"))),
    };

    let ok = verify_password(password, &user.password_hash)
        .map_err(|e| ApiError::Downstream(e.context("verify password")))?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let codec = TokenCodec::from_ref(st);
    let token = codec
        .issue(user.id, &user.email)
        .map_err(|e| ApiError::Downstream(e.context("issue token")))?;

    info!(user_id = %user.id, "user logged in");
    Ok((user, token))
}
