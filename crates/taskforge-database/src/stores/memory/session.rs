//! In-memory session store backed by `DashMap`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use taskforge_core::result::AppResult;
use taskforge_entity::session::{CreateSession, Session};

use crate::stores::SessionStore;

/// In-memory session store keyed by session ID.
///
/// `get_mut` holds the shard write lock for the duration of the closure,
/// which is what makes `rotate_tokens` a real compare-and-swap.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<DashMap<Uuid, Session>>,
}

impl MemorySessionStore {
    /// Create a new empty session store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.sessions.get(&id).map(|s| s.clone()))
    }

    async fn create(&self, data: &CreateSession) -> AppResult<Session> {
        let now = Utc::now();
        let session = Session {
            id: data.id,
            user_id: data.user_id,
            access_token_id: data.access_token_id,
            refresh_token_id: data.refresh_token_id,
            ip_address: data.ip_address.clone(),
            user_agent: data.user_agent.clone(),
            created_at: now,
            expires_at: data.expires_at,
            last_activity: now,
        };
        self.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn touch_activity(&self, id: Uuid) -> AppResult<()> {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.last_activity = Utc::now();
        }
        Ok(())
    }

    async fn rotate_tokens(
        &self,
        id: Uuid,
        expected_refresh_id: Uuid,
        new_access_id: Uuid,
        new_refresh_id: Uuid,
    ) -> AppResult<Option<Session>> {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            if session.refresh_token_id == expected_refresh_id {
                session.access_token_id = new_access_id;
                session.refresh_token_id = new_refresh_id;
                session.last_activity = Utc::now();
                return Ok(Some(session.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.sessions.remove(&id).is_some())
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut removed = 0u64;
        self.sessions.retain(|_, session| {
            if session.user_id == user_id {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut removed = 0u64;
        self.sessions.retain(|_, session| {
            if session.expires_at <= before {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session_data(user_id: Uuid) -> CreateSession {
        CreateSession {
            id: Uuid::new_v4(),
            user_id,
            access_token_id: Uuid::new_v4(),
            refresh_token_id: Uuid::new_v4(),
            ip_address: None,
            user_agent: None,
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn test_rotate_guard_rejects_stale_refresh_id() {
        let store = MemorySessionStore::new();
        let session = store.create(&session_data(Uuid::new_v4())).await.unwrap();

        let first = store
            .rotate_tokens(
                session.id,
                session.refresh_token_id,
                Uuid::new_v4(),
                Uuid::new_v4(),
            )
            .await
            .unwrap();
        assert!(first.is_some());

        // The original refresh ID has been rotated away.
        let second = store
            .rotate_tokens(
                session.id,
                session.refresh_token_id,
                Uuid::new_v4(),
                Uuid::new_v4(),
            )
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_only_removes_past_cutoff() {
        let store = MemorySessionStore::new();
        let live = store.create(&session_data(Uuid::new_v4())).await.unwrap();

        let mut stale = session_data(Uuid::new_v4());
        stale.expires_at = Utc::now() - Duration::minutes(5);
        store.create(&stale).await.unwrap();

        let removed = store.delete_expired(Utc::now()).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.find_by_id(live.id).await.unwrap().is_some());
        assert!(store.find_by_id(stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_all_for_user() {
        let store = MemorySessionStore::new();
        let user_id = Uuid::new_v4();
        store.create(&session_data(user_id)).await.unwrap();
        store.create(&session_data(user_id)).await.unwrap();
        let other = store.create(&session_data(Uuid::new_v4())).await.unwrap();

        assert_eq!(store.delete_all_for_user(user_id).await.unwrap(), 2);
        assert!(store.find_by_id(other.id).await.unwrap().is_some());
    }
}
