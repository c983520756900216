//! Authenticated request context with resolved roles and permissions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskforge_auth::rbac::PermissionSet;
use taskforge_core::result::AppResult;

/// Context for the current authenticated request.
///
/// Produced by [`IdentityService::authenticate`] and passed into service
/// methods so that every operation knows *who* is acting and from
/// *which* session. Roles and permissions are resolved from storage at
/// authentication time, so role changes apply to the very next request.
///
/// [`IdentityService::authenticate`]: crate::identity::IdentityService::authenticate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The current session ID.
    pub session_id: Uuid,
    /// Names of the roles the user holds, oldest assignment first.
    pub roles: Vec<String>,
    /// Union of the permission patterns granted by those roles.
    pub permissions: PermissionSet,
}

impl AuthContext {
    /// Checks whether the context grants an action.
    pub fn authorize(&self, action: &str) -> bool {
        self.permissions.allows(action)
    }

    /// Requires the action to be granted, failing with
    /// `PermissionDenied` otherwise.
    pub fn require(&self, action: &str) -> AppResult<()> {
        self.permissions.require(action)
    }

    /// Checks whether the user holds a role by name.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role == name)
    }
}
