use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::gateway::Identity,
    error::ApiError,
    files::{
        dto::{InitUploadRequest, InitUploadResponse},
        repo::FileRecord,
        services::init_upload_batch,
    },
    state::AppState,
    store::CredentialStore,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/files/init-upload", post(init_upload))
        .route("/folders/:folder_id/files", get(list_files))
}

#[instrument(skip(state, payload))]
pub async fn init_upload(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<InitUploadRequest>, JsonRejection>,
) -> Result<Json<InitUploadResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::ValidationFailed(e.body_text()))?;

    let uploads = init_upload_batch(
        &state,
        identity.user_id,
        payload.folder_id,
        &payload.files,
    )
    .await?;

    Ok(Json(InitUploadResponse { uploads }))
}

/// Reconciliation path for non-atomic batches: lists every record in the
/// folder, including rows still stuck in `uploading`.
#[instrument(skip(state))]
pub async fn list_files(
    State(state): State<AppState>,
    identity: Identity,
    Path(folder_id): Path<Uuid>,
) -> Result<Json<Vec<FileRecord>>, ApiError> {
    state
        .store
        .find_owned_folder(folder_id, identity.user_id)
        .await
        .map_err(|e| ApiError::Downstream(e.context("check folder ownership")))?
        .ok_or(ApiError::InvalidFolder)?;

    let files = state
        .store
        .list_files_by_folder(folder_id, identity.user_id)
        .await
        .map_err(|e| ApiError::Downstream(e.context("list files")))?;
    Ok(Json(files))
}
