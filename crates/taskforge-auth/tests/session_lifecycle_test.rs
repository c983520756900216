//! Integration tests for the session registry and token service
//! working together over the memory backend.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use taskforge_auth::jwt::{Claims, JwtDecoder, JwtEncoder, TokenType};
use taskforge_auth::session::SessionRegistry;
use taskforge_core::config::{SessionConfig, TokenConfig};
use taskforge_core::error::ErrorKind;
use taskforge_database::stores::MemorySessionStore;
use taskforge_entity::session::ClientMeta;

const SECRET: &str = "session-lifecycle-secret";

fn token_config(secret: &str) -> TokenConfig {
    TokenConfig {
        secret: secret.to_string(),
        access_ttl_minutes: 30,
        refresh_ttl_days: 14,
    }
}

fn registry(secret: &str) -> SessionRegistry {
    let config = token_config(secret);
    SessionRegistry::new(
        Arc::new(MemorySessionStore::new()),
        Arc::new(JwtEncoder::new(&config)),
        Arc::new(JwtDecoder::new(&config)),
        &SessionConfig { ttl_hours: 720 },
    )
}

#[tokio::test]
async fn test_refresh_chain_stays_on_one_session() {
    let registry = registry(SECRET);
    let user_id = Uuid::new_v4();
    let (session, mut tokens) = registry.open(user_id, &ClientMeta::default()).await.unwrap();

    // Walk a chain of rotations; every link lands on the same session.
    for _ in 0..5 {
        let (rotated, fresh) = registry.refresh(&tokens.refresh_token).await.unwrap();
        assert_eq!(rotated.id, session.id);

        let (claims, live) = registry.authenticate(&fresh.access_token).await.unwrap();
        assert_eq!(claims.user_id(), user_id);
        assert_eq!(live.id, session.id);

        tokens = fresh;
    }

    // Closing the session ends the whole chain.
    assert!(registry.close(session.id).await.unwrap());
    let err = registry.authenticate(&tokens.access_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionRevoked);
}

#[tokio::test]
async fn test_expired_access_token_outranks_live_session() {
    let registry = registry(SECRET);
    let (session, _) = registry
        .open(Uuid::new_v4(), &ClientMeta::default())
        .await
        .unwrap();

    // An access token for the live session, already past its own expiry.
    let claims = Claims {
        sub: session.user_id,
        sid: session.id,
        iat: Utc::now().timestamp() - 3600,
        exp: Utc::now().timestamp() - 60,
        jti: Uuid::new_v4(),
        token_type: TokenType::Access,
    };
    let stale = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    // The token's own expiry is checked before the session is consulted.
    let err = registry.authenticate(&stale).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenExpired);
}

#[tokio::test]
async fn test_tokens_do_not_cross_signing_keys() {
    let first = registry(SECRET);
    let second = registry("an-entirely-different-secret");

    let (_, tokens) = first
        .open(Uuid::new_v4(), &ClientMeta::default())
        .await
        .unwrap();

    let err = second.authenticate(&tokens.access_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenInvalid);
    let err = second.refresh(&tokens.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenInvalid);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let registry = registry(SECRET);
    let (_, tokens) = registry
        .open(Uuid::new_v4(), &ClientMeta::default())
        .await
        .unwrap();

    // Presenting the long-lived token where the short-lived one belongs
    // fails on type, not on session state.
    let err = registry.authenticate(&tokens.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenInvalid);

    let err = registry.refresh(&tokens.access_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenInvalid);
}
