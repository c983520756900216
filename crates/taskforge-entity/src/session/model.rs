//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An active user session.
///
/// Sessions are created on login and destroyed on logout, refresh-reuse
/// detection, or the expiry sweep. A session that is absent from the
/// store is revoked; a session row past `expires_at` is expired.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Token ID (`jti`) of the currently valid access token.
    pub access_token_id: Uuid,
    /// Token ID (`jti`) of the currently valid refresh token. Rotated on
    /// every refresh; a refresh token whose ID no longer matches was
    /// rotated away.
    pub refresh_token_id: Uuid,
    /// IP address from which the session was created.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the session expires (absolute lifetime, never extended).
    pub expires_at: DateTime<Utc>,
    /// Last authenticated activity timestamp.
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has outlived its absolute lifetime.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Calculate how long the session has been idle (in seconds).
    pub fn idle_seconds(&self) -> i64 {
        (Utc::now() - self.last_activity).num_seconds().max(0)
    }
}

/// Client metadata captured at login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMeta {
    /// IP address of the client, if known.
    pub ip_address: Option<String>,
    /// User-Agent header, if supplied.
    pub user_agent: Option<String>,
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// Pre-assigned session identifier, so tokens minted before the
    /// insert can already carry it.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Token ID of the initial access token.
    pub access_token_id: Uuid,
    /// Token ID of the initial refresh token.
    pub refresh_token_id: Uuid,
    /// IP address of the client.
    pub ip_address: Option<String>,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}
