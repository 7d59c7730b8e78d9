use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// File record. Created with status `uploading` before the presigned URL
/// is issued, so the row exists even when the client never completes the
/// upload. Status moves to `complete` or `failed` via a completion
/// callback that is out of scope here; a row may therefore stay
/// `uploading` indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub storage_key: String,
    pub bucket_name: String,
    pub status: String,
    pub checksum: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert parameters for a new file record. The id and storage key are
/// generated server-side by the upload initiator.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub folder_id: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub storage_key: String,
    pub bucket_name: String,
}

impl FileRecord {
    pub async fn create(db: &PgPool, new: &NewFileRecord) -> anyhow::Result<FileRecord> {
        let record = sqlx::query_as::<_, FileRecord>(
            r#"
            INSERT INTO files
                (id, user_id, folder_id, file_name, file_size, file_type,
                 storage_key, bucket_name, status, checksum)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'uploading', NULL)
            RETURNING id, user_id, folder_id, file_name, file_size, file_type,
                      storage_key, bucket_name, status, checksum, created_at
            "#,
        )
        .bind(new.id)
        .bind(new.user_id)
        .bind(new.folder_id)
        .bind(&new.file_name)
        .bind(new.file_size)
        .bind(&new.file_type)
        .bind(&new.storage_key)
        .bind(&new.bucket_name)
        .fetch_one(db)
        .await?;
        Ok(record)
    }

    pub async fn list_by_folder(
        db: &PgPool,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, FileRecord>(
            r#"
            SELECT id, user_id, folder_id, file_name, file_size, file_type,
                   storage_key, bucket_name, status, checksum, created_at
            FROM files
            WHERE folder_id = $1 AND user_id = $2
            ORDER BY created_at ASC
            "#,
        )
        .bind(folder_id)
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
