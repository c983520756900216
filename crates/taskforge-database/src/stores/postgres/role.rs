//! PostgreSQL role store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use taskforge_core::error::{AppError, ErrorKind};
use taskforge_core::result::AppResult;
use taskforge_entity::role::{CreateRole, Role};

use crate::stores::RoleStore;

/// Role store backed by the `roles` and `user_roles` tables.
#[derive(Debug, Clone)]
pub struct PostgresRoleStore {
    pool: PgPool,
}

impl PostgresRoleStore {
    /// Create a new role store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PostgresRoleStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role by id", e))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find role by name", e)
            })
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))
    }

    async fn create(&self, data: &CreateRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, permissions, is_system) \
             VALUES ($1, $2, $3) \
             RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.permissions)
        .bind(data.is_system)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("roles_name_key") => {
                AppError::conflict(format!("Role '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create role", e),
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete role", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to assign role", e))?;
        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke role", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn roles_for_user(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT r.* FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 \
             ORDER BY ur.assigned_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list user roles", e))
    }
}
