use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One file descriptor in an init-upload batch: name, declared size and
/// declared MIME type. All three are client assertions, validated but
/// never used to derive the storage key.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFileInput {
    pub name: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
pub struct InitUploadRequest {
    pub folder_id: Uuid,
    pub files: Vec<UploadFileInput>,
}

#[derive(Debug, Serialize)]
pub struct UploadEntry {
    pub file_id: Uuid,
    pub upload_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct InitUploadResponse {
    pub uploads: Vec<UploadEntry>,
}
