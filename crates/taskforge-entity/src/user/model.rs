//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user in the Taskforge system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique email address.
    pub email: String,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account can authenticate. Users are never hard-deleted;
    /// deactivation flips this flag instead.
    pub is_active: bool,
    /// Whether the email address has been verified.
    pub is_verified: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.is_active
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
}

/// Data for updating an existing user's profile.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// New email address. Resets the verified flag when changed.
    pub email: Option<String>,
    /// New username.
    pub username: Option<String>,
}
