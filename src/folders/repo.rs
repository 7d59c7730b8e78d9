use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Folder record. `parent_id` is NULL only for the root; a partial unique
/// index guarantees one root per user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub is_root: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Folder {
    /// Create the per-user root folder. Called only from account
    /// provisioning, which compensates the user insert when this fails.
    pub async fn create_root(db: &PgPool, user_id: Uuid) -> anyhow::Result<Folder> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            INSERT INTO folders (user_id, name, parent_id, is_root)
            VALUES ($1, 'root', NULL, TRUE)
            RETURNING id, user_id, name, parent_id, is_root, created_at
            "#,
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(folder)
    }

    pub async fn find_root(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, user_id, name, parent_id, is_root, created_at
            FROM folders
            WHERE user_id = $1 AND is_root
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(folder)
    }

    /// Ownership check for a client-supplied folder id. Re-run on every
    /// request; never cached.
    pub async fn find_owned(
        db: &PgPool,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, user_id, name, parent_id, is_root, created_at
            FROM folders
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(folder_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(folder)
    }
}
