//! Role administration — system role seeding, custom roles, assignment.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_database::stores::{RoleStore, UserStore};
use taskforge_entity::role::{CreateRole, Role};

/// Name of the role granted to every new registration.
pub const DEFAULT_ROLE: &str = "user";

/// The protected roles every deployment carries, with their grants.
const SYSTEM_ROLES: &[(&str, &[&str])] = &[
    ("admin", &["*"]),
    ("user", &["tasks.*", "posts.*", "comments.*", "profile.*"]),
    ("guest", &["posts.read", "comments.read"]),
];

/// Administers roles and their assignment to users.
///
/// Role changes take effect on the next `authenticate` call for the
/// affected users; no token needs to be reissued.
#[derive(Clone)]
pub struct RoleService {
    /// Role persistence.
    roles: Arc<dyn RoleStore>,
    /// User persistence, for existence checks.
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for RoleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleService").finish_non_exhaustive()
    }
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(roles: Arc<dyn RoleStore>, users: Arc<dyn UserStore>) -> Self {
        Self { roles, users }
    }

    /// Creates any missing system roles. Idempotent; safe to run at
    /// every startup. Existing roles are left untouched.
    pub async fn ensure_system_roles(&self) -> AppResult<()> {
        let mut seeded = 0u32;

        for (name, permissions) in SYSTEM_ROLES {
            if self.roles.find_by_name(name).await?.is_some() {
                continue;
            }
            self.roles
                .create(&CreateRole {
                    name: (*name).to_string(),
                    permissions: permissions.iter().map(|p| (*p).to_string()).collect(),
                    is_system: true,
                })
                .await?;
            seeded += 1;
        }

        if seeded > 0 {
            info!(seeded = seeded, "System roles seeded");
        }
        Ok(())
    }

    /// Creates a custom role. Fails with `Conflict` if the name is
    /// taken.
    pub async fn create_role(&self, name: &str, permissions: Vec<String>) -> AppResult<Role> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Role name must not be empty"));
        }
        if permissions
            .iter()
            .any(|p| p.is_empty() || p.contains(char::is_whitespace))
        {
            return Err(AppError::validation(
                "Permission patterns must be non-empty and contain no whitespace",
            ));
        }

        let role = self
            .roles
            .create(&CreateRole {
                name: name.to_string(),
                permissions,
                is_system: false,
            })
            .await?;

        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    /// Deletes a custom role, dropping its assignments with it. System
    /// roles cannot be deleted.
    pub async fn delete_role(&self, role_id: Uuid) -> AppResult<()> {
        let role = self
            .roles
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))?;

        if role.is_system {
            return Err(AppError::validation("System roles cannot be deleted"));
        }

        self.roles.delete(role.id).await?;
        info!(role_id = %role.id, name = %role.name, "Role deleted");
        Ok(())
    }

    /// Assigns a role to a user by role name. Idempotent.
    pub async fn assign_role(&self, user_id: Uuid, role_name: &str) -> AppResult<()> {
        self.require_user(user_id).await?;
        let role = self.require_role(role_name).await?;

        self.roles.assign(user_id, role.id).await?;
        info!(user_id = %user_id, role = %role.name, "Role assigned");
        Ok(())
    }

    /// Revokes a role from a user by role name. Returns `false` if the
    /// user did not hold it.
    pub async fn revoke_role(&self, user_id: Uuid, role_name: &str) -> AppResult<bool> {
        self.require_user(user_id).await?;
        let role = self.require_role(role_name).await?;

        let revoked = self.roles.revoke(user_id, role.id).await?;
        if revoked {
            info!(user_id = %user_id, role = %role.name, "Role revoked");
        }
        Ok(revoked)
    }

    /// Lists the roles a user holds, oldest assignment first.
    pub async fn roles_of(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        self.require_user(user_id).await?;
        self.roles.roles_for_user(user_id).await
    }

    /// Lists every role.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.roles.list().await
    }

    async fn require_user(&self, user_id: Uuid) -> AppResult<()> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn require_role(&self, name: &str) -> AppResult<Role> {
        self.roles
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))
    }
}
