//! Shard repository: workspace-scoped access to shards.

use sqlx::{PgPool, Postgres};
use tether_core::models::Shard;
use tether_core::AppError;
use uuid::Uuid;

/// Repository for the shards table.
#[derive(Clone)]
pub struct ShardRepository {
    pool: PgPool,
}

impl ShardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a shard by id, enforcing workspace ownership.
    #[tracing::instrument(skip(self), fields(db.table = "shards", db.record_id = %shard_id))]
    pub async fn get(&self, shard_id: Uuid, workspace_id: Uuid) -> Result<Shard, AppError> {
        let shard: Option<Shard> = sqlx::query_as::<Postgres, Shard>(
            "SELECT id, workspace_id, name, created_at, updated_at FROM shards WHERE id = $1",
        )
        .bind(shard_id)
        .fetch_optional(&self.pool)
        .await?;

        let shard = shard.ok_or_else(|| AppError::NotFound("Shard not found".to_string()))?;

        if shard.workspace_id != workspace_id {
            return Err(AppError::Unauthorized("Unauthorized".to_string()));
        }

        Ok(shard)
    }

    /// All shards belonging to a workspace.
    #[tracing::instrument(skip(self), fields(db.table = "shards"))]
    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Shard>, AppError> {
        let shards: Vec<Shard> = sqlx::query_as::<Postgres, Shard>(
            r#"
            SELECT id, workspace_id, name, created_at, updated_at
            FROM shards
            WHERE workspace_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(shards)
    }
}
