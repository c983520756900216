//! Session lifecycle: open, authenticate, refresh, close.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use taskforge_core::config::SessionConfig;
use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_database::stores::SessionStore;
use taskforge_entity::session::{ClientMeta, CreateSession, Session, TokenPair};

use crate::jwt::{Claims, JwtDecoder, JwtEncoder};

/// Manages the session lifecycle on top of the session store.
///
/// A session that is absent from the store is revoked; a session row
/// past its `expires_at` is expired. The two cases carry distinct error
/// kinds so clients can tell "log in again" apart from "you were logged
/// out".
#[derive(Clone)]
pub struct SessionRegistry {
    /// Session persistence.
    sessions: Arc<dyn SessionStore>,
    /// Token creation.
    encoder: Arc<JwtEncoder>,
    /// Token validation.
    decoder: Arc<JwtDecoder>,
    /// Absolute session lifetime in hours.
    ttl_hours: i64,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl SessionRegistry {
    /// Creates a new session registry.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            sessions,
            encoder,
            decoder,
            ttl_hours: config.ttl_hours as i64,
        }
    }

    /// Opens a new session for a user and mints its first token pair.
    ///
    /// The session ID is assigned before the tokens are minted so the
    /// pair already carries it; the stored row records both token IDs
    /// for rotation tracking.
    pub async fn open(&self, user_id: Uuid, meta: &ClientMeta) -> AppResult<(Session, TokenPair)> {
        // Step 1: mint the token pair under a pre-assigned session ID.
        let session_id = Uuid::new_v4();
        let issued = self.encoder.generate_token_pair(user_id, session_id)?;

        // Step 2: persist the session row.
        let session = self
            .sessions
            .create(&CreateSession {
                id: session_id,
                user_id,
                access_token_id: issued.access_token_id,
                refresh_token_id: issued.refresh_token_id,
                ip_address: meta.ip_address.clone(),
                user_agent: meta.user_agent.clone(),
                expires_at: Utc::now() + Duration::hours(self.ttl_hours),
            })
            .await?;

        info!(user_id = %user_id, session_id = %session_id, "Session opened");
        Ok((session, issued.tokens))
    }

    /// Authenticates an access token and returns its claims with the
    /// live session.
    ///
    /// Fails with `TokenExpired`/`TokenInvalid` if the token itself is
    /// bad, `SessionRevoked` if the session was closed, and
    /// `SessionExpired` if it outlived its absolute lifetime. Access
    /// tokens from before a refresh stay usable until they expire; only
    /// the session's liveness is checked here.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<(Claims, Session)> {
        let claims = self.decoder.decode_access_token(access_token)?;

        let session = self
            .sessions
            .find_by_id(claims.session_id())
            .await?
            .ok_or_else(|| AppError::session_revoked("Session has been revoked"))?;

        if session.is_expired() {
            debug!(session_id = %session.id, "Rejected access to expired session");
            return Err(AppError::session_expired("Session has expired"));
        }

        self.sessions.touch_activity(session.id).await?;
        Ok((claims, session))
    }

    /// Exchanges a refresh token for a fresh token pair, rotating the
    /// pair recorded on the session.
    ///
    /// Rotation is guarded by the stored refresh token ID: presenting a
    /// refresh token that has already been rotated away closes the whole
    /// session and fails with `TokenInvalid`, on the assumption that one
    /// of the two presenters is an attacker.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(Session, TokenPair)> {
        // Step 1: validate the presented token.
        let claims = self.decoder.decode_refresh_token(refresh_token)?;

        // Step 2: the session must still be live.
        let session = self
            .sessions
            .find_by_id(claims.session_id())
            .await?
            .ok_or_else(|| AppError::session_revoked("Session has been revoked"))?;

        if session.is_expired() {
            return Err(AppError::session_expired("Session has expired"));
        }

        // Step 3: mint the replacement pair, then swap it in guarded by
        // the presented token's ID. Exactly one concurrent caller wins.
        let issued = self
            .encoder
            .generate_token_pair(session.user_id, session.id)?;

        let rotated = self
            .sessions
            .rotate_tokens(
                session.id,
                claims.jti,
                issued.access_token_id,
                issued.refresh_token_id,
            )
            .await?;

        match rotated {
            Some(updated) => {
                info!(
                    user_id = %updated.user_id,
                    session_id = %updated.id,
                    "Token pair rotated"
                );
                Ok((updated, issued.tokens))
            }
            None => {
                // The stored ID moved on: this token was already spent.
                warn!(
                    session_id = %session.id,
                    "Rotated refresh token presented again; closing session"
                );
                self.sessions.delete(session.id).await?;
                Err(AppError::token_invalid("Refresh token is no longer valid"))
            }
        }
    }

    /// Closes a session. Idempotent: closing an unknown or already
    /// closed session returns `Ok(false)`.
    pub async fn close(&self, session_id: Uuid) -> AppResult<bool> {
        let existed = self.sessions.delete(session_id).await?;
        if existed {
            info!(session_id = %session_id, "Session closed");
        }
        Ok(existed)
    }

    /// Closes every session belonging to a user. Returns the count.
    pub async fn close_all(&self, user_id: Uuid) -> AppResult<u64> {
        let closed = self.sessions.delete_all_for_user(user_id).await?;
        info!(user_id = %user_id, closed = closed, "All sessions closed");
        Ok(closed)
    }
}
