//! Connection repository: CRUD and workspace scoping for connections.
//!
//! A connection belongs to a shard, which belongs to a workspace. Scoped
//! operations resolve ownership through that chain and reject callers from
//! other workspaces before touching the row.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tether_core::models::{
    AuthData, Connection, ConnectionCreate, ConnectionDeleted, ConnectionUpdate, Shard, Workspace,
};
use tether_core::AppError;
use uuid::Uuid;
use validator::Validate;

use super::shard::ShardRepository;

const SELECT_SCOPED: &str = r#"
    SELECT c.id, c.shard_id, c.name, c.provider, c.auth_data,
           c.created_at, c.updated_at, s.workspace_id
    FROM connections c
    JOIN shards s ON s.id = c.shard_id
"#;

/// Row type for the connections table joined with its owning shard.
#[derive(Debug, sqlx::FromRow)]
pub struct ConnectionRow {
    pub id: Uuid,
    pub shard_id: Uuid,
    pub name: String,
    pub provider: String,
    pub auth_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub workspace_id: Uuid,
}

impl ConnectionRow {
    pub fn to_connection(self) -> Result<Connection, AppError> {
        let auth_data = self
            .auth_data
            .map(serde_json::from_value::<AuthData>)
            .transpose()?;

        Ok(Connection {
            id: self.id,
            shard_id: self.shard_id,
            name: self.name,
            provider: self.provider,
            auth_data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for the connections table.
#[derive(Clone)]
pub struct ConnectionRepository {
    pool: PgPool,
    shards: ShardRepository,
}

impl ConnectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: pool.clone(),
            shards: ShardRepository::new(pool),
        }
    }

    /// Create a connection under a shard of the caller's workspace.
    /// The shard is resolved through the workspace scope first, so a caller
    /// cannot attach a connection to another workspace's shard.
    #[tracing::instrument(skip(self, data), fields(db.table = "connections"))]
    pub async fn create(
        &self,
        data: ConnectionCreate,
        workspace_id: Uuid,
    ) -> Result<Connection, AppError> {
        data.validate()?;
        let shard = self.shards.get(data.shard_id, workspace_id).await?;

        let auth_data = data
            .auth_data
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row: ConnectionRow = sqlx::query_as::<Postgres, ConnectionRow>(
            r#"
            WITH inserted AS (
                INSERT INTO connections (shard_id, name, provider, auth_data)
                VALUES ($1, $2, $3, $4)
                RETURNING id, shard_id, name, provider, auth_data, created_at, updated_at
            )
            SELECT i.*, s.workspace_id
            FROM inserted i
            JOIN shards s ON s.id = i.shard_id
            "#,
        )
        .bind(shard.id)
        .bind(&data.name)
        .bind(&data.provider)
        .bind(auth_data)
        .fetch_one(&self.pool)
        .await?;

        row.to_connection()
    }

    /// Fetch a connection by id, enforcing workspace ownership.
    #[tracing::instrument(skip(self), fields(db.table = "connections", db.record_id = %connection_id))]
    pub async fn get(
        &self,
        connection_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Connection, AppError> {
        let row = self.fetch_row(connection_id).await?;

        if row.workspace_id != workspace_id {
            return Err(AppError::Unauthorized("Unauthorized".to_string()));
        }

        row.to_connection()
    }

    /// Unscoped fetch for platform administration.
    #[tracing::instrument(skip(self), fields(db.table = "connections", db.record_id = %connection_id))]
    pub async fn get_as_platform_admin(
        &self,
        connection_id: Uuid,
    ) -> Result<Connection, AppError> {
        self.fetch_row(connection_id).await?.to_connection()
    }

    /// Workspace that owns a connection, resolved through its shard.
    #[tracing::instrument(skip(self), fields(db.table = "connections", db.record_id = %connection_id))]
    pub async fn get_workspace_as_platform_admin(
        &self,
        connection_id: Uuid,
    ) -> Result<Workspace, AppError> {
        let workspace: Option<Workspace> = sqlx::query_as::<Postgres, Workspace>(
            r#"
            SELECT w.id, w.name, w.created_at, w.updated_at
            FROM workspaces w
            JOIN shards s ON s.workspace_id = w.id
            JOIN connections c ON c.shard_id = s.id
            WHERE c.id = $1
            "#,
        )
        .bind(connection_id)
        .fetch_optional(&self.pool)
        .await?;

        workspace.ok_or_else(|| AppError::NotFound("Connection not found".to_string()))
    }

    /// All connections across the workspace's shards. An empty workspace is
    /// reported as NotFound, matching the original service contract.
    #[tracing::instrument(skip(self), fields(db.table = "connections"))]
    pub async fn list(&self, workspace_id: Uuid) -> Result<Vec<Connection>, AppError> {
        let rows: Vec<ConnectionRow> = sqlx::query_as::<Postgres, ConnectionRow>(&format!(
            "{} WHERE s.workspace_id = $1 ORDER BY c.created_at",
            SELECT_SCOPED
        ))
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound("Connections not found".to_string()));
        }

        rows.into_iter().map(ConnectionRow::to_connection).collect()
    }

    /// Number of connections in a workspace.
    #[tracing::instrument(skip(self), fields(db.table = "connections"))]
    pub async fn count(&self, workspace_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM connections c
            JOIN shards s ON s.id = c.shard_id
            WHERE s.workspace_id = $1
            "#,
        )
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Partial update: fields left as None keep their current value.
    #[tracing::instrument(skip(self, updates), fields(db.table = "connections", db.record_id = %connection_id))]
    pub async fn update(
        &self,
        connection_id: Uuid,
        updates: ConnectionUpdate,
        workspace_id: Uuid,
    ) -> Result<Connection, AppError> {
        updates.validate()?;
        // Scope check before the write
        self.get(connection_id, workspace_id).await?;

        let auth_data = updates
            .auth_data
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;

        let row: ConnectionRow = sqlx::query_as::<Postgres, ConnectionRow>(
            r#"
            WITH updated AS (
                UPDATE connections
                SET name = COALESCE($2, name),
                    provider = COALESCE($3, provider),
                    auth_data = COALESCE($4, auth_data),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id, shard_id, name, provider, auth_data, created_at, updated_at
            )
            SELECT u.*, s.workspace_id
            FROM updated u
            JOIN shards s ON s.id = u.shard_id
            "#,
        )
        .bind(connection_id)
        .bind(updates.name.as_deref())
        .bind(updates.provider.as_deref())
        .bind(auth_data)
        .fetch_one(&self.pool)
        .await?;

        row.to_connection()
    }

    /// Delete a connection, enforcing workspace ownership.
    #[tracing::instrument(skip(self), fields(db.table = "connections", db.record_id = %connection_id))]
    pub async fn delete(
        &self,
        connection_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<ConnectionDeleted, AppError> {
        self.get(connection_id, workspace_id).await?;

        sqlx::query("DELETE FROM connections WHERE id = $1")
            .bind(connection_id)
            .execute(&self.pool)
            .await?;

        Ok(ConnectionDeleted {
            id: connection_id,
            success: true,
        })
    }

    /// Shard that owns a connection, enforcing workspace ownership.
    #[tracing::instrument(skip(self), fields(db.table = "connections", db.record_id = %connection_id))]
    pub async fn get_shard(
        &self,
        connection_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Shard, AppError> {
        let connection = self.get(connection_id, workspace_id).await?;
        self.shards.get(connection.shard_id, workspace_id).await
    }

    /// Persist refreshed credentials for a connection.
    #[tracing::instrument(skip(self, auth_data), fields(db.table = "connections", db.record_id = %connection_id))]
    pub async fn set_auth_data(
        &self,
        connection_id: Uuid,
        auth_data: &AuthData,
    ) -> Result<(), AppError> {
        let value = serde_json::to_value(auth_data)?;

        let result = sqlx::query(
            "UPDATE connections SET auth_data = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(connection_id)
        .bind(value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Connection not found".to_string()));
        }

        Ok(())
    }

    async fn fetch_row(&self, connection_id: Uuid) -> Result<ConnectionRow, AppError> {
        let row: Option<ConnectionRow> = sqlx::query_as::<Postgres, ConnectionRow>(&format!(
            "{} WHERE c.id = $1",
            SELECT_SCOPED
        ))
        .bind(connection_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound("Connection not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(auth_data: Option<serde_json::Value>) -> ConnectionRow {
        ConnectionRow {
            id: Uuid::new_v4(),
            shard_id: Uuid::new_v4(),
            name: "box sync".to_string(),
            provider: "box".to_string(),
            auth_data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            workspace_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_row_without_auth_data() {
        let connection = row(None).to_connection().unwrap();
        assert!(connection.auth_data.is_none());
    }

    #[test]
    fn test_row_parses_auth_data() {
        let connection = row(Some(json!({
            "access_token": "tok",
            "refresh_token": "refresh",
            "expires_in": 28800,
            "token_type": "bearer"
        })))
        .to_connection()
        .unwrap();

        let auth = connection.auth_data.unwrap();
        assert_eq!(auth.access_token.as_deref(), Some("tok"));
        assert_eq!(auth.expires_in, Some(28800));
        assert_eq!(auth.extra.get("token_type"), Some(&json!("bearer")));
    }

    #[test]
    fn test_row_with_malformed_auth_data_errors() {
        let result = row(Some(json!("not-an-object"))).to_connection();
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
