//! In-memory role store using a Tokio mutex for single-node deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_entity::role::{CreateRole, Role};

use crate::stores::RoleStore;

/// Internal state for the memory-based role store.
#[derive(Debug, Default)]
struct InnerState {
    /// Roles keyed by ID.
    roles: HashMap<Uuid, Role>,
    /// Assignment timestamps keyed by (user, role).
    assignments: HashMap<(Uuid, Uuid), DateTime<Utc>>,
}

/// In-memory role store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    /// Protected inner state.
    state: Arc<Mutex<InnerState>>,
}

impl MemoryRoleStore {
    /// Create a new empty role store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Role>> {
        Ok(self.state.lock().await.roles.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .values()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
        let mut roles: Vec<Role> = state.roles.values().cloned().collect();
        roles.sort_by_key(|r| r.created_at);
        Ok(roles)
    }

    async fn create(&self, data: &CreateRole) -> AppResult<Role> {
        let mut state = self.state.lock().await;

        if state
            .roles
            .values()
            .any(|r| r.name.eq_ignore_ascii_case(&data.name))
        {
            return Err(AppError::conflict(format!(
                "Role '{}' already exists",
                data.name
            )));
        }

        let role = Role {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            permissions: data.permissions.clone(),
            is_system: data.is_system,
            created_at: Utc::now(),
        };
        state.roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let removed = state.roles.remove(&id).is_some();
        if removed {
            state.assignments.retain(|(_, role_id), _| *role_id != id);
        }
        Ok(removed)
    }

    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .assignments
            .entry((user_id, role_id))
            .or_insert_with(Utc::now);
        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state.assignments.remove(&(user_id, role_id)).is_some())
    }

    async fn roles_for_user(&self, user_id: Uuid) -> AppResult<Vec<Role>> {
        let state = self.state.lock().await;
        let mut held: Vec<(DateTime<Utc>, Role)> = state
            .assignments
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .filter_map(|((_, role_id), assigned_at)| {
                state.roles.get(role_id).map(|r| (*assigned_at, r.clone()))
            })
            .collect();
        held.sort_by_key(|(assigned_at, _)| *assigned_at);
        Ok(held.into_iter().map(|(_, role)| role).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_data(name: &str, patterns: &[&str]) -> CreateRole {
        CreateRole {
            name: name.to_string(),
            permissions: patterns.iter().map(|p| p.to_string()).collect(),
            is_system: false,
        }
    }

    #[tokio::test]
    async fn test_assign_is_idempotent() {
        let store = MemoryRoleStore::new();
        let role = store.create(&role_data("editor", &["posts.*"])).await.unwrap();
        let user_id = Uuid::new_v4();

        store.assign(user_id, role.id).await.unwrap();
        store.assign(user_id, role.id).await.unwrap();

        assert_eq!(store.roles_for_user(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_revoke_unheld_role_is_noop() {
        let store = MemoryRoleStore::new();
        let role = store.create(&role_data("editor", &["posts.*"])).await.unwrap();

        assert!(!store.revoke(Uuid::new_v4(), role.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_clears_assignments() {
        let store = MemoryRoleStore::new();
        let role = store.create(&role_data("editor", &["posts.*"])).await.unwrap();
        let user_id = Uuid::new_v4();
        store.assign(user_id, role.id).await.unwrap();

        assert!(store.delete(role.id).await.unwrap());
        assert!(store.roles_for_user(user_id).await.unwrap().is_empty());
    }
}
