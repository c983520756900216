//! PostgreSQL user store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use taskforge_core::error::{AppError, ErrorKind};
use taskforge_core::result::AppResult;
use taskforge_entity::user::{CreateUser, UpdateProfile, User};

use crate::stores::UserStore;

/// User store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new user store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-violation on the identity indexes to `DuplicateIdentity`.
fn map_identity_conflict(e: sqlx::Error, context: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_email_key") => {
            AppError::duplicate_identity("Email already in use")
        }
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("users_username_key") => {
            AppError::duplicate_identity("Username already in use")
        }
        _ => AppError::with_source(ErrorKind::Database, context.to_string(), e),
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, username, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_identity_conflict(e, "Failed to create user"))
    }

    async fn update_profile(&self, id: Uuid, data: &UpdateProfile) -> AppResult<User> {
        // SET expressions see the old row, so the CASE compares against
        // the previous email.
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
                 email = COALESCE($2, email), \
                 username = COALESCE($3, username), \
                 is_verified = CASE \
                     WHEN $2 IS NOT NULL AND LOWER($2) IS DISTINCT FROM LOWER(email) THEN FALSE \
                     ELSE is_verified \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_identity_conflict(e, "Failed to update profile"))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update password", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_verified = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(verified)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to set verified flag", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(active)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to set active flag", e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update last login", e)
            })?;
        Ok(())
    }
}
