//! PostgreSQL session store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use taskforge_core::error::{AppError, ErrorKind};
use taskforge_core::result::AppResult;
use taskforge_entity::session::{CreateSession, Session};

use crate::stores::SessionStore;

/// Session store backed by the `sessions` table.
#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    /// Create a new session store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn create(&self, data: &CreateSession) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions \
                 (id, user_id, access_token_id, refresh_token_id, ip_address, user_agent, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(data.id)
        .bind(data.user_id)
        .bind(data.access_token_id)
        .bind(data.refresh_token_id)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    async fn touch_activity(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE sessions SET last_activity = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last activity", e)
            })?;
        Ok(())
    }

    async fn rotate_tokens(
        &self,
        id: Uuid,
        expected_refresh_id: Uuid,
        new_access_id: Uuid,
        new_refresh_id: Uuid,
    ) -> AppResult<Option<Session>> {
        // The refresh_token_id guard makes concurrent rotations of the
        // same token a single-winner race.
        sqlx::query_as::<_, Session>(
            "UPDATE sessions SET \
                 access_token_id = $3, \
                 refresh_token_id = $4, \
                 last_activity = NOW() \
             WHERE id = $1 AND refresh_token_id = $2 \
             RETURNING *",
        )
        .bind(id)
        .bind(expected_refresh_id)
        .bind(new_access_id)
        .bind(new_refresh_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rotate tokens", e))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete session", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete user sessions", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired sessions", e)
            })?;
        Ok(result.rows_affected())
    }
}
