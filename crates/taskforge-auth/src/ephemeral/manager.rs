//! Issuance and single-use consumption of ephemeral tokens.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use taskforge_core::config::EphemeralConfig;
use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_database::stores::EphemeralTokenStore;
use taskforge_entity::token::{CreateEphemeralToken, TokenKind};

/// Number of random bytes behind each token value.
const TOKEN_BYTES: usize = 32;

/// Issues and consumes single-use tokens for email verification and
/// password reset.
///
/// Only a SHA-256 digest of the token value is stored; the plaintext
/// value exists once, in the return value of the issue call. Consumption
/// is atomic: a token presented twice succeeds exactly once.
#[derive(Clone)]
pub struct EphemeralTokenManager {
    /// Token persistence.
    tokens: Arc<dyn EphemeralTokenStore>,
    /// Email verification token TTL in hours.
    verification_ttl_hours: i64,
    /// Password reset token TTL in minutes.
    reset_ttl_minutes: i64,
}

impl std::fmt::Debug for EphemeralTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralTokenManager")
            .field("verification_ttl_hours", &self.verification_ttl_hours)
            .field("reset_ttl_minutes", &self.reset_ttl_minutes)
            .finish()
    }
}

impl EphemeralTokenManager {
    /// Creates a new manager from ephemeral token configuration.
    pub fn new(tokens: Arc<dyn EphemeralTokenStore>, config: &EphemeralConfig) -> Self {
        Self {
            tokens,
            verification_ttl_hours: config.verification_ttl_hours as i64,
            reset_ttl_minutes: config.reset_ttl_minutes as i64,
        }
    }

    /// Issues an email verification token and returns its opaque value.
    pub async fn issue_verification(&self, user_id: Uuid) -> AppResult<String> {
        let expires_at = Utc::now() + Duration::hours(self.verification_ttl_hours);
        self.issue(user_id, TokenKind::Verification, expires_at)
            .await
    }

    /// Issues a password reset token and returns its opaque value.
    pub async fn issue_reset(&self, user_id: Uuid) -> AppResult<String> {
        let expires_at = Utc::now() + Duration::minutes(self.reset_ttl_minutes);
        self.issue(user_id, TokenKind::PasswordReset, expires_at)
            .await
    }

    /// Consumes an email verification token, returning the owning user.
    pub async fn consume_verification(&self, value: &str) -> AppResult<Uuid> {
        self.consume(value, TokenKind::Verification).await
    }

    /// Consumes a password reset token, returning the owning user.
    pub async fn consume_reset(&self, value: &str) -> AppResult<Uuid> {
        self.consume(value, TokenKind::PasswordReset).await
    }

    /// Deletes every outstanding token for a user, consumed or not.
    /// Returns the count.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = self.tokens.delete_all_for_user(user_id).await?;
        if revoked > 0 {
            info!(user_id = %user_id, revoked = revoked, "Ephemeral tokens revoked");
        }
        Ok(revoked)
    }

    async fn issue(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> AppResult<String> {
        let value = generate_value();

        self.tokens
            .create(&CreateEphemeralToken {
                user_id,
                token_hash: digest(&value),
                kind,
                expires_at,
            })
            .await?;

        info!(user_id = %user_id, kind = %kind, "Ephemeral token issued");
        Ok(value)
    }

    /// Atomically consumes a token of the given kind.
    ///
    /// On failure the store is consulted once more to tell the caller
    /// why: unknown value (or wrong kind), expired, or already used.
    async fn consume(&self, value: &str, kind: TokenKind) -> AppResult<Uuid> {
        let token_hash = digest(value);
        let now = Utc::now();

        if let Some(token) = self.tokens.consume(&token_hash, kind, now).await? {
            info!(user_id = %token.user_id, kind = %kind, "Ephemeral token consumed");
            return Ok(token.user_id);
        }

        match self.tokens.find_by_hash(&token_hash, kind).await? {
            None => Err(AppError::token_not_found("Token not found")),
            Some(token) if token.expires_at <= now => {
                Err(AppError::token_expired("Token has expired"))
            }
            Some(_) => Err(AppError::token_already_used("Token has already been used")),
        }
    }
}

/// Generates an opaque token value from 32 random bytes.
fn generate_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 digest of a token value, the only form ever stored.
fn digest(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskforge_core::error::ErrorKind;
    use taskforge_database::stores::MemoryEphemeralTokenStore;

    fn manager() -> EphemeralTokenManager {
        EphemeralTokenManager::new(
            Arc::new(MemoryEphemeralTokenStore::new()),
            &EphemeralConfig {
                verification_ttl_hours: 24,
                reset_ttl_minutes: 30,
            },
        )
    }

    #[test]
    fn test_generated_values_are_unique_and_url_safe() {
        let first = generate_value();
        let second = generate_value();

        assert_ne!(first, second);
        assert!(first.len() >= 40);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[tokio::test]
    async fn test_issue_and_consume_roundtrip() {
        let manager = manager();
        let user_id = Uuid::new_v4();

        let value = manager.issue_verification(user_id).await.unwrap();
        let owner = manager.consume_verification(&value).await.unwrap();
        assert_eq!(owner, user_id);
    }

    #[tokio::test]
    async fn test_second_consume_is_already_used() {
        let manager = manager();
        let value = manager.issue_reset(Uuid::new_v4()).await.unwrap();

        manager.consume_reset(&value).await.unwrap();
        let err = manager.consume_reset(&value).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenAlreadyUsed);
    }

    #[tokio::test]
    async fn test_unknown_value_is_not_found() {
        let manager = manager();
        let err = manager
            .consume_verification("no-such-token-value")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenNotFound);
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_not_found() {
        let manager = manager();
        let value = manager.issue_verification(Uuid::new_v4()).await.unwrap();

        // A verification token is invisible to the reset flow.
        let err = manager.consume_reset(&value).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenNotFound);

        // And it is still consumable for its real purpose.
        assert!(manager.consume_verification(&value).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_token_is_expired() {
        let manager = EphemeralTokenManager::new(
            Arc::new(MemoryEphemeralTokenStore::new()),
            &EphemeralConfig {
                verification_ttl_hours: 24,
                reset_ttl_minutes: 0, // expires immediately
            },
        );

        let value = manager.issue_reset(Uuid::new_v4()).await.unwrap();
        let err = manager.consume_reset(&value).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenExpired);
    }

    #[tokio::test]
    async fn test_concurrent_consume_has_one_winner() {
        let manager = manager();
        let value = manager.issue_verification(Uuid::new_v4()).await.unwrap();

        let first = manager.consume_verification(&value);
        let second = manager.consume_verification(&value);
        let (first, second) = tokio::join!(first, second);

        let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_revoke_all_clears_outstanding_tokens() {
        let manager = manager();
        let user_id = Uuid::new_v4();

        let verification = manager.issue_verification(user_id).await.unwrap();
        let reset = manager.issue_reset(user_id).await.unwrap();

        assert_eq!(manager.revoke_all_for_user(user_id).await.unwrap(), 2);

        let err = manager.consume_verification(&verification).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenNotFound);
        let err = manager.consume_reset(&reset).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenNotFound);
    }
}
