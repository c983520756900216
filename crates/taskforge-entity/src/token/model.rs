//! Ephemeral token entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::TokenKind;

/// A single-use token for email verification or password reset.
///
/// Only a SHA-256 digest of the opaque token value is stored; the
/// plaintext exists solely in the issuance return value. A token with a
/// non-null `consumed_at` is never accepted again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EphemeralToken {
    /// Unique token identifier.
    pub id: Uuid,
    /// The user the token was issued for.
    pub user_id: Uuid,
    /// SHA-256 digest (hex) of the opaque token value.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// What the token authorizes.
    pub kind: TokenKind,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
    /// When the token was redeemed, if ever.
    pub consumed_at: Option<DateTime<Utc>>,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl EphemeralToken {
    /// Check whether the token is past its expiry instant.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Check whether the token has already been redeemed.
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}

/// Data required to issue a new ephemeral token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEphemeralToken {
    /// The user the token is issued for.
    pub user_id: Uuid,
    /// SHA-256 digest (hex) of the opaque token value.
    pub token_hash: String,
    /// What the token authorizes.
    pub kind: TokenKind,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}
