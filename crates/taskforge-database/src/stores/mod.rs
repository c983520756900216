//! Store traits and their implementations.
//!
//! The identity core talks to persistence exclusively through these
//! traits so it can run against PostgreSQL in deployment and against the
//! in-memory backend in tests. Implementations must keep the two
//! compare-and-swap paths (`SessionStore::rotate_tokens`,
//! `EphemeralTokenStore::consume`) atomic: concurrent callers get
//! exactly one winner.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use taskforge_core::result::AppResult;
use taskforge_entity::role::{CreateRole, Role};
use taskforge_entity::session::{CreateSession, Session};
use taskforge_entity::token::{CreateEphemeralToken, EphemeralToken, TokenKind};
use taskforge_entity::user::{CreateUser, UpdateProfile, User};

pub use memory::{
    MemoryEphemeralTokenStore, MemoryRoleStore, MemorySessionStore, MemoryUserStore,
};
pub use postgres::{
    PostgresEphemeralTokenStore, PostgresRoleStore, PostgresSessionStore, PostgresUserStore,
};

/// Persistence operations for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a new user. Fails with `DuplicateIdentity` if the email or
    /// username is already taken.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Update profile fields. `None` fields are left untouched; changing
    /// the email clears the verified flag in the same write.
    async fn update_profile(&self, id: Uuid, data: &UpdateProfile) -> AppResult<User>;

    /// Replace the password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Set the verified flag.
    async fn set_verified(&self, id: Uuid, verified: bool) -> AppResult<()>;

    /// Set the active flag.
    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<()>;

    /// Record a successful login.
    async fn touch_last_login(&self, id: Uuid) -> AppResult<()>;
}

/// Persistence operations for roles and role assignments.
#[async_trait]
pub trait RoleStore: Send + Sync + 'static {
    /// Find a role by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>>;

    /// Find a role by name (case-insensitive).
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// List every role.
    async fn list(&self) -> AppResult<Vec<Role>>;

    /// Create a new role. Fails with `Conflict` if the name is taken.
    async fn create(&self, data: &CreateRole) -> AppResult<Role>;

    /// Delete a role. Returns `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Assign a role to a user. Idempotent.
    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()>;

    /// Revoke a role from a user. Returns `false` if it was not held.
    async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool>;

    /// List the roles a user holds, oldest assignment first.
    async fn roles_for_user(&self, user_id: Uuid) -> AppResult<Vec<Role>>;
}

/// Persistence operations for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Find a session by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Insert a new session with its application-assigned ID.
    async fn create(&self, data: &CreateSession) -> AppResult<Session>;

    /// Update the last-activity timestamp.
    async fn touch_activity(&self, id: Uuid) -> AppResult<()>;

    /// Swap in a fresh token pair, guarded by the currently stored
    /// refresh token ID. Returns the updated session, or `None` if the
    /// guard did not match (the token was already rotated away) or the
    /// session no longer exists.
    async fn rotate_tokens(
        &self,
        id: Uuid,
        expected_refresh_id: Uuid,
        new_access_id: Uuid,
        new_refresh_id: Uuid,
    ) -> AppResult<Option<Session>>;

    /// Delete a session. Returns `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Delete every session belonging to a user. Returns the count.
    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;

    /// Delete every session whose expiry is at or before the cutoff.
    /// Returns the count.
    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Persistence operations for single-use tokens.
#[async_trait]
pub trait EphemeralTokenStore: Send + Sync + 'static {
    /// Insert a new token.
    async fn create(&self, data: &CreateEphemeralToken) -> AppResult<EphemeralToken>;

    /// Find a token by value digest and kind.
    async fn find_by_hash(&self, token_hash: &str, kind: TokenKind)
    -> AppResult<Option<EphemeralToken>>;

    /// Atomically mark a token consumed, if and only if it is currently
    /// unconsumed and unexpired as of `now`. Returns the consumed token
    /// on success, `None` otherwise; callers disambiguate `None` with
    /// [`find_by_hash`](Self::find_by_hash).
    async fn consume(
        &self,
        token_hash: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AppResult<Option<EphemeralToken>>;

    /// Delete every token whose expiry is at or before the cutoff,
    /// consumed or not. Returns the count.
    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;

    /// Delete every token belonging to a user. Returns the count.
    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}
