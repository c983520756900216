//! Permission set evaluation over role grants.

use serde::{Deserialize, Serialize};

use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_entity::role::Role;

use super::pattern::pattern_grants;

/// The union of permission patterns a user holds across their roles.
///
/// Evaluation is pure and additive: any single pattern granting an
/// action is enough, no pattern can subtract, and an empty set denies
/// everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Deduplicated patterns, in first-seen order.
    patterns: Vec<String>,
}

impl PermissionSet {
    /// Builds an empty set, which denies every action.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the union of the permission patterns of the given roles.
    pub fn from_roles(roles: &[Role]) -> Self {
        let mut patterns: Vec<String> = Vec::new();
        for role in roles {
            for pattern in &role.permissions {
                if !patterns.iter().any(|existing| existing == pattern) {
                    patterns.push(pattern.clone());
                }
            }
        }
        Self { patterns }
    }

    /// Checks whether any held pattern grants the action.
    pub fn allows(&self, action: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern_grants(pattern, action))
    }

    /// Requires the action to be granted, failing with
    /// `PermissionDenied` otherwise.
    pub fn require(&self, action: &str) -> AppResult<()> {
        if self.allows(action) {
            return Ok(());
        }
        Err(AppError::permission_denied(format!(
            "Permission denied for action '{action}'"
        )))
    }

    /// The held patterns, in first-seen order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether the set holds no patterns at all.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn role(name: &str, permissions: &[&str]) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            is_system: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_set_denies_everything() {
        let set = PermissionSet::empty();
        assert!(!set.allows("tasks.read"));
        assert!(set.require("tasks.read").is_err());
    }

    #[test]
    fn test_union_across_roles_is_additive() {
        let roles = vec![
            role("writer", &["posts.create", "posts.update"]),
            role("moderator", &["comments.*"]),
        ];
        let set = PermissionSet::from_roles(&roles);

        assert!(set.allows("posts.create"));
        assert!(set.allows("comments.delete"));
        assert!(!set.allows("posts.delete"));
        assert!(!set.allows("tasks.read"));
    }

    #[test]
    fn test_duplicate_patterns_collapse() {
        let roles = vec![
            role("a", &["tasks.read", "tasks.write"]),
            role("b", &["tasks.read"]),
        ];
        let set = PermissionSet::from_roles(&roles);
        assert_eq!(set.patterns(), &["tasks.read", "tasks.write"]);
    }

    #[test]
    fn test_admin_wildcard_short_circuits() {
        let set = PermissionSet::from_roles(&[role("admin", &["*"])]);
        assert!(set.allows("anything.at_all"));
        assert!(set.require("admin.shutdown").is_ok());
    }

    #[test]
    fn test_require_reports_the_action() {
        let set = PermissionSet::from_roles(&[role("guest", &["posts.read"])]);
        let err = set.require("posts.delete").unwrap_err();
        assert_eq!(err.kind, taskforge_core::error::ErrorKind::PermissionDenied);
        assert!(err.to_string().contains("posts.delete"));
    }
}
