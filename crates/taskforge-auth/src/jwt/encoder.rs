//! Signed token creation with configurable signing and TTL.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use taskforge_core::config::TokenConfig;
use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_entity::session::TokenPair;

use super::claims::{Claims, TokenType};

/// Creates signed access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
    /// Refresh token TTL in days.
    refresh_ttl_days: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish()
    }
}

/// A freshly minted token pair together with the token IDs the session
/// row must record for rotation tracking.
#[derive(Debug, Clone)]
pub struct IssuedTokenPair {
    /// The signed pair handed back to the caller.
    pub tokens: TokenPair,
    /// `jti` of the access token.
    pub access_token_id: Uuid,
    /// `jti` of the refresh token.
    pub refresh_token_id: Uuid,
}

impl JwtEncoder {
    /// Creates a new encoder from token configuration.
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            access_ttl_minutes: config.access_ttl_minutes as i64,
            refresh_ttl_days: config.refresh_ttl_days as i64,
        }
    }

    /// Generates a new access + refresh token pair for the given user and
    /// session. Both tokens carry fresh `jti` values.
    pub fn generate_token_pair(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> AppResult<IssuedTokenPair> {
        let now = Utc::now();
        let access_exp = now + Duration::minutes(self.access_ttl_minutes);
        let refresh_exp = now + Duration::days(self.refresh_ttl_days);

        let access_token_id = Uuid::new_v4();
        let refresh_token_id = Uuid::new_v4();

        let access_claims = Claims {
            sub: user_id,
            sid: session_id,
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
            jti: access_token_id,
            token_type: TokenType::Access,
        };

        let refresh_claims = Claims {
            sub: user_id,
            sid: session_id,
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
            jti: refresh_token_id,
            token_type: TokenType::Refresh,
        };

        let access_token = encode(&Header::default(), &access_claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        let refresh_token = encode(&Header::default(), &refresh_claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(IssuedTokenPair {
            tokens: TokenPair {
                access_token,
                refresh_token,
                access_expires_at: access_exp,
                refresh_expires_at: refresh_exp,
            },
            access_token_id,
            refresh_token_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig {
            secret: "unit-test-secret".to_string(),
            access_ttl_minutes: 30,
            refresh_ttl_days: 14,
        }
    }

    #[test]
    fn test_generate_token_pair_has_distinct_token_ids() {
        let encoder = JwtEncoder::new(&test_config());
        let issued = encoder
            .generate_token_pair(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        assert_ne!(issued.access_token_id, issued.refresh_token_id);
        assert_ne!(issued.tokens.access_token, issued.tokens.refresh_token);
        assert!(issued.tokens.refresh_expires_at > issued.tokens.access_expires_at);
    }

    #[test]
    fn test_token_pairs_are_unique_per_call() {
        let encoder = JwtEncoder::new(&test_config());
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let first = encoder.generate_token_pair(user_id, session_id).unwrap();
        let second = encoder.generate_token_pair(user_id, session_id).unwrap();

        assert_ne!(first.access_token_id, second.access_token_id);
        assert_ne!(first.refresh_token_id, second.refresh_token_id);
    }
}
