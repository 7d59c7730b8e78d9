use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    files::{
        dto::{UploadEntry, UploadFileInput},
        repo::NewFileRecord,
    },
    state::AppState,
    store::CredentialStore,
};

/// Presigned PUT URLs issued for batch uploads stay valid for 24 hours.
pub const UPLOAD_URL_TTL_SECS: u64 = 24 * 60 * 60;

/// Storage keys are derived from the owner and the fresh file id, never
/// from the client-supplied name, so keys cannot collide or escape the
/// per-user prefix.
pub fn storage_key(user_id: Uuid, file_id: Uuid) -> String {
    format!("users/{}/files/{}", user_id, file_id)
}

fn validate_batch(files: &[UploadFileInput]) -> Result<(), ApiError> {
    if files.is_empty() {
        return Err(ApiError::ValidationFailed("files must not be empty".into()));
    }
    for (i, f) in files.iter().enumerate() {
        if f.name.trim().is_empty() {
            return Err(ApiError::ValidationFailed(format!(
                "files[{}].name must not be empty",
                i
            )));
        }
        if f.size <= 0 {
            return Err(ApiError::ValidationFailed(format!(
                "files[{}].size must be positive",
                i
            )));
        }
        if f.content_type.trim().is_empty() {
            return Err(ApiError::ValidationFailed(format!(
                "files[{}].type must not be empty",
                i
            )));
        }
    }
    Ok(())
}

/// Initiate a batch upload: validate descriptors (before any side
/// effect), re-check folder ownership, then per file create the record
/// and obtain a presigned URL, in input order.
///
/// The batch is not atomic. A mid-loop failure fails the whole request
/// and leaves earlier records in `uploading`; callers reconcile by
/// listing the folder rather than assuming all-or-nothing.
pub async fn init_upload_batch(
    st: &AppState,
    user_id: Uuid,
    folder_id: Uuid,
    files: &[UploadFileInput],
) -> Result<Vec<UploadEntry>, ApiError> {
    validate_batch(files)?;

    let folder = st
        .store
        .find_owned_folder(folder_id, user_id)
        .await
        .map_err(|e| ApiError::Downstream(e.context("check folder ownership")))?;
    if folder.is_none() {
        warn!(user_id = %user_id, folder_id = %folder_id, "init upload into foreign or missing folder");
        return Err(ApiError::InvalidFolder);
    }

    let bucket = st.config.storage.bucket.as_str();
    let mut uploads = Vec::with_capacity(files.len());
    for f in files {
        let file_id = Uuid::new_v4();
        let key = storage_key(user_id, file_id);

        // Record first, URL second: the row must exist even if the client
        // never uses the URL.
        st.store
            .create_file_record(NewFileRecord {
                id: file_id,
                user_id,
                folder_id,
                file_name: f.name.clone(),
                file_size: f.size,
                file_type: f.content_type.clone(),
                storage_key: key.clone(),
                bucket_name: bucket.to_string(),
            })
            .await
            .map_err(|e| ApiError::Downstream(e.context("create file record")))?;

        let presigned = st
            .storage
            .presign_put(&key, &f.content_type, UPLOAD_URL_TTL_SECS)
            .await
            .map_err(|e| ApiError::Downstream(e.context("presign upload url")))?;

        uploads.push(UploadEntry {
            file_id,
            upload_url: presigned.url,
            expires_at: presigned.expires_at,
        });
    }

    info!(user_id = %user_id, folder_id = %folder_id, count = uploads.len(), "upload batch initiated");
    Ok(uploads)
}
