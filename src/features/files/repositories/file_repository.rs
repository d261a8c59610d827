use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::dtos::FileListQuery;
use crate::features::files::models::{File, NewFile};
use crate::shared::validation::escape_like;

const FILE_COLUMNS: &str = "id, user_id, folder_id, original_name, display_name, file_type, \
    file_size, mime_type, storage_path, encrypted_key, ai_generated_name, tags, metadata, \
    created_at, updated_at";

/// Owner-scoped file access. Every query filters by `user_id`.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Newest first
    async fn list(&self, user_id: Uuid, query: &FileListQuery) -> Result<Vec<File>>;

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64>;

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<File>>;

    /// Most recent file whose display name contains `name`, case-insensitive
    async fn find_latest_by_name(&self, user_id: Uuid, name: &str) -> Result<Option<File>>;

    async fn create(&self, new_file: NewFile) -> Result<File>;

    /// Returns false when no owned file matched
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn list(&self, user_id: Uuid, query: &FileListQuery) -> Result<Vec<File>> {
        let pattern = query
            .search
            .as_deref()
            .map(|q| format!("%{}%", escape_like(q)));

        let files = sqlx::query_as::<_, File>(&format!(
            r#"
            SELECT {}
            FROM files
            WHERE user_id = $1
              AND ($2::uuid IS NULL OR folder_id = $2)
              AND ($3::text IS NULL
                   OR display_name ILIKE $3 ESCAPE '\'
                   OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE lower(t) = lower($4)))
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
            FILE_COLUMNS
        ))
        .bind(user_id)
        .bind(query.folder_id)
        .bind(pattern)
        .bind(query.search.as_deref())
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!(
            "SELECT {} FROM files WHERE id = $1 AND user_id = $2",
            FILE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn find_latest_by_name(&self, user_id: Uuid, name: &str) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(&format!(
            r#"
            SELECT {}
            FROM files
            WHERE user_id = $1 AND display_name ILIKE $2 ESCAPE '\'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            FILE_COLUMNS
        ))
        .bind(user_id)
        .bind(format!("%{}%", escape_like(name)))
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn create(&self, new_file: NewFile) -> Result<File> {
        let file = sqlx::query_as::<_, File>(&format!(
            r#"
            INSERT INTO files
                (id, user_id, folder_id, original_name, display_name, file_type, file_size,
                 mime_type, storage_path, encrypted_key, ai_generated_name, tags, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(new_file.user_id)
        .bind(new_file.folder_id)
        .bind(&new_file.original_name)
        .bind(&new_file.display_name)
        .bind(&new_file.file_type)
        .bind(new_file.file_size)
        .bind(&new_file.mime_type)
        .bind(&new_file.storage_path)
        .bind(&new_file.encrypted_key)
        .bind(new_file.ai_generated_name)
        .bind(&new_file.tags)
        .bind(Json(&new_file.metadata))
        .fetch_one(&self.pool)
        .await?;

        Ok(file)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
