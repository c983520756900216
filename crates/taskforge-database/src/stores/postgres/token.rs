//! PostgreSQL ephemeral token store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use taskforge_core::error::{AppError, ErrorKind};
use taskforge_core::result::AppResult;
use taskforge_entity::token::{CreateEphemeralToken, EphemeralToken, TokenKind};

use crate::stores::EphemeralTokenStore;

/// Ephemeral token store backed by the `ephemeral_tokens` table.
#[derive(Debug, Clone)]
pub struct PostgresEphemeralTokenStore {
    pool: PgPool,
}

impl PostgresEphemeralTokenStore {
    /// Create a new ephemeral token store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EphemeralTokenStore for PostgresEphemeralTokenStore {
    async fn create(&self, data: &CreateEphemeralToken) -> AppResult<EphemeralToken> {
        sqlx::query_as::<_, EphemeralToken>(
            "INSERT INTO ephemeral_tokens (user_id, token_hash, kind, expires_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(data.user_id)
        .bind(&data.token_hash)
        .bind(data.kind)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create ephemeral token", e)
        })
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
        kind: TokenKind,
    ) -> AppResult<Option<EphemeralToken>> {
        sqlx::query_as::<_, EphemeralToken>(
            "SELECT * FROM ephemeral_tokens WHERE token_hash = $1 AND kind = $2",
        )
        .bind(token_hash)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find ephemeral token", e)
        })
    }

    async fn consume(
        &self,
        token_hash: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AppResult<Option<EphemeralToken>> {
        // Single guarded UPDATE: concurrent redemptions of one token get
        // exactly one row back.
        sqlx::query_as::<_, EphemeralToken>(
            "UPDATE ephemeral_tokens SET consumed_at = $3 \
             WHERE token_hash = $1 AND kind = $2 AND consumed_at IS NULL AND expires_at > $3 \
             RETURNING *",
        )
        .bind(token_hash)
        .bind(kind)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume ephemeral token", e)
        })
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM ephemeral_tokens WHERE expires_at <= $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired tokens", e)
            })?;
        Ok(result.rows_affected())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM ephemeral_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete user tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
