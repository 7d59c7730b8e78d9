use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::gateway::Identity, error::ApiError, folders::repo::Folder, state::AppState,
    store::CredentialStore,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/folders/root", get(get_root_folder))
}

#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub folder: Folder,
}

#[instrument(skip(state))]
pub async fn get_root_folder(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<FolderResponse>, ApiError> {
    let folder = state
        .store
        .find_root_folder(identity.user_id)
        .await
        .map_err(|e| ApiError::Downstream(e.context("find root folder")))?
        .ok_or(ApiError::InvalidFolder)?;
    Ok(Json(FolderResponse { folder }))
}
