use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::folders::models::{Folder, NewFolder};

const FOLDER_COLUMNS: &str = "id, user_id, name, parent_id, folder_type, created_at, updated_at";

/// Owner-scoped folder access. Every query filters by `user_id`.
#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// All folders of a user, oldest first
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Folder>>;

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Folder>>;

    async fn create(&self, new_folder: NewFolder) -> Result<Folder>;
}

pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {} FROM folders WHERE user_id = $1 ORDER BY created_at ASC",
            FOLDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(folders)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {} FROM folders WHERE id = $1 AND user_id = $2",
            FOLDER_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(folder)
    }

    async fn create(&self, new_folder: NewFolder) -> Result<Folder> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            r#"
            INSERT INTO folders (id, user_id, name, parent_id, folder_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            FOLDER_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(new_folder.user_id)
        .bind(&new_folder.name)
        .bind(new_folder.parent_id)
        .bind(new_folder.folder_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(folder)
    }
}
