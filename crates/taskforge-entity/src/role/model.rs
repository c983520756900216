//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named role granting a set of permission patterns.
///
/// Patterns take one of three forms: `*` (everything), `resource.*`
/// (any action on a resource), or `resource.action` (exact). A user's
/// effective grants are the union of the patterns of every role they
/// hold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Unique role identifier.
    pub id: Uuid,
    /// Unique role name (e.g. `"admin"`, `"user"`).
    pub name: String,
    /// Permission patterns granted by this role, in declaration order.
    pub permissions: Vec<String>,
    /// System roles are seeded at install time and cannot be deleted.
    pub is_system: bool,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

/// A user-to-role assignment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRole {
    /// The assigned user.
    pub user_id: Uuid,
    /// The assigned role.
    pub role_id: Uuid,
    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
}

/// Data required to create a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    /// Unique role name.
    pub name: String,
    /// Permission patterns granted by the role.
    pub permissions: Vec<String>,
    /// Whether the role is a protected system role.
    pub is_system: bool,
}
