//! In-memory ephemeral token store backed by `DashMap`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use taskforge_core::result::AppResult;
use taskforge_entity::token::{CreateEphemeralToken, EphemeralToken, TokenKind};

use crate::stores::EphemeralTokenStore;

/// In-memory ephemeral token store keyed by value digest.
#[derive(Debug, Clone, Default)]
pub struct MemoryEphemeralTokenStore {
    tokens: Arc<DashMap<String, EphemeralToken>>,
}

impl MemoryEphemeralTokenStore {
    /// Create a new empty token store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralTokenStore for MemoryEphemeralTokenStore {
    async fn create(&self, data: &CreateEphemeralToken) -> AppResult<EphemeralToken> {
        let token = EphemeralToken {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            token_hash: data.token_hash.clone(),
            kind: data.kind,
            expires_at: data.expires_at,
            consumed_at: None,
            created_at: Utc::now(),
        };
        self.tokens.insert(token.token_hash.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_hash(
        &self,
        token_hash: &str,
        kind: TokenKind,
    ) -> AppResult<Option<EphemeralToken>> {
        Ok(self
            .tokens
            .get(token_hash)
            .filter(|t| t.kind == kind)
            .map(|t| t.clone()))
    }

    async fn consume(
        &self,
        token_hash: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AppResult<Option<EphemeralToken>> {
        // get_mut holds the shard write lock, so only one caller can pass
        // the consumed_at check.
        if let Some(mut token) = self.tokens.get_mut(token_hash) {
            if token.kind == kind && token.consumed_at.is_none() && token.expires_at > now {
                token.consumed_at = Some(now);
                return Ok(Some(token.clone()));
            }
        }
        Ok(None)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut removed = 0u64;
        self.tokens.retain(|_, token| {
            if token.expires_at <= before {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let mut removed = 0u64;
        self.tokens.retain(|_, token| {
            if token.user_id == user_id {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}
