use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::files::repo::{FileRecord, NewFileRecord};
use crate::folders::repo::Folder;

/// Persistence seam for users, folders and file records, mirroring
/// `StorageClient`: Postgres is the only implementation used at runtime,
/// and tests drive the orchestration paths through an in-memory fake.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> anyhow::Result<User>;
    async fn delete_user(&self, id: Uuid) -> anyhow::Result<()>;

    async fn create_root_folder(&self, user_id: Uuid) -> anyhow::Result<Folder>;
    async fn find_root_folder(&self, user_id: Uuid) -> anyhow::Result<Option<Folder>>;
    async fn find_owned_folder(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Folder>>;

    async fn create_file_record(&self, new: NewFileRecord) -> anyhow::Result<FileRecord>;
    async fn list_files_by_folder(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<FileRecord>>;
}

/// Postgres-backed store; delegates to the per-module repo queries.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        User::find_by_email(&self.db, email).await
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> anyhow::Result<User> {
        User::create(&self.db, email, password_hash, name).await
    }

    async fn delete_user(&self, id: Uuid) -> anyhow::Result<()> {
        User::delete(&self.db, id).await
    }

    async fn create_root_folder(&self, user_id: Uuid) -> anyhow::Result<Folder> {
        Folder::create_root(&self.db, user_id).await
    }

    async fn find_root_folder(&self, user_id: Uuid) -> anyhow::Result<Option<Folder>> {
        Folder::find_root(&self.db, user_id).await
    }

    async fn find_owned_folder(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<Folder>> {
        Folder::find_owned(&self.db, folder_id, user_id).await
    }

    async fn create_file_record(&self, new: NewFileRecord) -> anyhow::Result<FileRecord> {
        FileRecord::create(&self.db, &new).await
    }

    async fn list_files_by_folder(
        &self,
        folder_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<FileRecord>> {
        FileRecord::list_by_folder(&self.db, folder_id, user_id).await
    }
}
