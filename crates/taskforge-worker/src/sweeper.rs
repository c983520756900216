//! Deletion of expired sessions and ephemeral tokens.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use taskforge_database::stores::{EphemeralTokenStore, SessionStore};

/// Counts from one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Sessions removed because their lifetime ended.
    pub expired_sessions: u64,
    /// Ephemeral tokens removed past their TTL, consumed or not.
    pub expired_tokens: u64,
}

impl SweepReport {
    /// Total rows removed by the run.
    pub fn total(&self) -> u64 {
        self.expired_sessions + self.expired_tokens
    }
}

/// Deletes expired sessions and ephemeral tokens.
///
/// Each run is delete-where-expired against a single cutoff, which makes
/// runs idempotent and safe to overlap with request traffic or with
/// other sweeper instances. A failure in one half is logged and the
/// other half still runs; a sweep never aborts the process.
#[derive(Clone)]
pub struct ExpirySweeper {
    /// Session persistence.
    sessions: Arc<dyn SessionStore>,
    /// Ephemeral token persistence.
    tokens: Arc<dyn EphemeralTokenStore>,
}

impl std::fmt::Debug for ExpirySweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirySweeper").finish_non_exhaustive()
    }
}

impl ExpirySweeper {
    /// Creates a new sweeper.
    pub fn new(sessions: Arc<dyn SessionStore>, tokens: Arc<dyn EphemeralTokenStore>) -> Self {
        Self { sessions, tokens }
    }

    /// Runs one sweep against the current clock and reports the counts.
    pub async fn run_sweep(&self) -> SweepReport {
        let cutoff = Utc::now();
        let mut report = SweepReport::default();

        match self.sessions.delete_expired(cutoff).await {
            Ok(count) => report.expired_sessions = count,
            Err(e) => error!(error = %e, "Session sweep failed; continuing"),
        }

        match self.tokens.delete_expired(cutoff).await {
            Ok(count) => report.expired_tokens = count,
            Err(e) => error!(error = %e, "Ephemeral token sweep failed; continuing"),
        }

        info!(
            expired_sessions = report.expired_sessions,
            expired_tokens = report.expired_tokens,
            "Expiry sweep completed"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use taskforge_database::stores::{MemoryEphemeralTokenStore, MemorySessionStore};
    use taskforge_entity::session::CreateSession;
    use taskforge_entity::token::{CreateEphemeralToken, TokenKind};
    use uuid::Uuid;

    async fn seed_session(store: &MemorySessionStore, expires_in_hours: i64) -> Uuid {
        let id = Uuid::new_v4();
        store
            .create(&CreateSession {
                id,
                user_id: Uuid::new_v4(),
                access_token_id: Uuid::new_v4(),
                refresh_token_id: Uuid::new_v4(),
                ip_address: None,
                user_agent: None,
                expires_at: Utc::now() + Duration::hours(expires_in_hours),
            })
            .await
            .unwrap();
        id
    }

    async fn seed_token(store: &MemoryEphemeralTokenStore, expires_in_hours: i64, hash: &str) {
        store
            .create(&CreateEphemeralToken {
                user_id: Uuid::new_v4(),
                token_hash: hash.to_string(),
                kind: TokenKind::Verification,
                expires_at: Utc::now() + Duration::hours(expires_in_hours),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_rows() {
        let sessions = Arc::new(MemorySessionStore::new());
        let tokens = Arc::new(MemoryEphemeralTokenStore::new());

        let dead_session = seed_session(&sessions, -1).await;
        let live_session = seed_session(&sessions, 1).await;
        seed_token(&tokens, -1, "dead").await;
        seed_token(&tokens, 1, "live").await;

        let sweeper = ExpirySweeper::new(sessions.clone(), tokens.clone());
        let report = sweeper.run_sweep().await;

        assert_eq!(
            report,
            SweepReport {
                expired_sessions: 1,
                expired_tokens: 1,
            }
        );
        assert_eq!(report.total(), 2);

        assert!(sessions.find_by_id(dead_session).await.unwrap().is_none());
        assert!(sessions.find_by_id(live_session).await.unwrap().is_some());
        assert!(
            tokens
                .find_by_hash("live", TokenKind::Verification)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let sessions = Arc::new(MemorySessionStore::new());
        let tokens = Arc::new(MemoryEphemeralTokenStore::new());
        seed_session(&sessions, -1).await;

        let sweeper = ExpirySweeper::new(sessions, tokens);
        assert_eq!(sweeper.run_sweep().await.expired_sessions, 1);
        assert_eq!(sweeper.run_sweep().await.expired_sessions, 0);
    }

    #[tokio::test]
    async fn test_sweep_removes_consumed_tokens_once_expired() {
        let sessions = Arc::new(MemorySessionStore::new());
        let tokens = Arc::new(MemoryEphemeralTokenStore::new());

        // A token consumed long ago but past expiry is still swept.
        seed_token(&tokens, -1, "spent").await;
        tokens
            .consume("spent", TokenKind::Verification, Utc::now() - Duration::hours(2))
            .await
            .unwrap();

        let sweeper = ExpirySweeper::new(sessions, tokens.clone());
        assert_eq!(sweeper.run_sweep().await.expired_tokens, 1);
        assert!(
            tokens
                .find_by_hash("spent", TokenKind::Verification)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_sweep_on_empty_stores_reports_zero() {
        let sweeper = ExpirySweeper::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(MemoryEphemeralTokenStore::new()),
        );
        assert_eq!(sweeper.run_sweep().await.total(), 0);
    }
}
