//! In-memory user store using a Tokio mutex for single-node deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_entity::user::{CreateUser, UpdateProfile, User};

use crate::stores::UserStore;

/// In-memory user store keyed by user ID.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    /// Protected user map.
    state: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    /// Create a new empty user store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn identity_taken(
    users: &HashMap<Uuid, User>,
    email: Option<&str>,
    username: Option<&str>,
    exclude: Option<Uuid>,
) -> Option<AppError> {
    for user in users.values() {
        if Some(user.id) == exclude {
            continue;
        }
        if let Some(email) = email {
            if user.email.eq_ignore_ascii_case(email) {
                return Some(AppError::duplicate_identity("Email already in use"));
            }
        }
        if let Some(username) = username {
            if user.username.eq_ignore_ascii_case(username) {
                return Some(AppError::duplicate_identity("Username already in use"));
            }
        }
    }
    None
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut users = self.state.lock().await;

        if let Some(err) = identity_taken(&users, Some(&data.email), Some(&data.username), None) {
            return Err(err);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email.clone(),
            username: data.username.clone(),
            password_hash: data.password_hash.clone(),
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, data: &UpdateProfile) -> AppResult<User> {
        let mut users = self.state.lock().await;

        if let Some(err) = identity_taken(
            &users,
            data.email.as_deref(),
            data.username.as_deref(),
            Some(id),
        ) {
            return Err(err);
        }

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        if let Some(email) = &data.email {
            if !user.email.eq_ignore_ascii_case(email) {
                user.is_verified = false;
            }
            user.email = email.clone();
        }
        if let Some(username) = &data.username {
            user.username = username.clone();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut users = self.state.lock().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> AppResult<()> {
        let mut users = self.state.lock().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.is_verified = verified;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<()> {
        let mut users = self.state.lock().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.is_active = active;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn touch_last_login(&self, id: Uuid) -> AppResult<()> {
        let mut users = self.state.lock().await;
        if let Some(user) = users.get_mut(&id) {
            let now = Utc::now();
            user.last_login_at = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_data(email: &str, username: &str) -> CreateUser {
        CreateUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryUserStore::new();
        let user = store
            .create(&create_data("a@example.com", "alice"))
            .await
            .unwrap();

        assert!(!user.is_verified);
        assert!(user.is_active);
        assert_eq!(
            store.find_by_id(user.id).await.unwrap().unwrap().id,
            user.id
        );
        assert!(
            store
                .find_by_email("A@EXAMPLE.COM")
                .await
                .unwrap()
                .is_some()
        );
        assert!(store.find_by_username("ALICE").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store
            .create(&create_data("a@example.com", "alice"))
            .await
            .unwrap();

        let err = store
            .create(&create_data("A@example.com", "other"))
            .await
            .unwrap_err();
        assert_eq!(
            err.kind,
            taskforge_core::error::ErrorKind::DuplicateIdentity
        );
    }

    #[tokio::test]
    async fn test_email_change_clears_verified() {
        let store = MemoryUserStore::new();
        let user = store
            .create(&create_data("a@example.com", "alice"))
            .await
            .unwrap();
        store.set_verified(user.id, true).await.unwrap();

        let updated = store
            .update_profile(
                user.id,
                &UpdateProfile {
                    email: Some("b@example.com".to_string()),
                    username: None,
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_verified);
    }
}
