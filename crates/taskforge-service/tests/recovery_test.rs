//! Integration tests for email verification and password reset.

mod helpers;

use helpers::TestApp;
use taskforge_core::error::ErrorKind;
use taskforge_database::UserStore;
use taskforge_entity::session::ClientMeta;

#[tokio::test]
async fn test_email_verification_flow() {
    let app = TestApp::new().await;
    let user = app
        .identity
        .register("alice@example.com", "alice", "a-long-password")
        .await
        .unwrap();
    assert!(!user.is_verified);

    let token = app
        .identity
        .request_email_verification(user.id)
        .await
        .unwrap();
    let verified_id = app
        .identity
        .confirm_email_verification(&token)
        .await
        .unwrap();
    assert_eq!(verified_id, user.id);

    let stored = app.users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.is_verified);
}

#[tokio::test]
async fn test_verification_token_is_single_use() {
    let app = TestApp::new().await;
    let user = app
        .identity
        .register("alice@example.com", "alice", "a-long-password")
        .await
        .unwrap();

    let token = app
        .identity
        .request_email_verification(user.id)
        .await
        .unwrap();
    app.identity
        .confirm_email_verification(&token)
        .await
        .unwrap();

    let err = app
        .identity
        .confirm_email_verification(&token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenAlreadyUsed);
}

#[tokio::test]
async fn test_verification_request_for_verified_user_conflicts() {
    let app = TestApp::new().await;
    let user = app
        .identity
        .register("alice@example.com", "alice", "a-long-password")
        .await
        .unwrap();

    let token = app
        .identity
        .request_email_verification(user.id)
        .await
        .unwrap();
    app.identity
        .confirm_email_verification(&token)
        .await
        .unwrap();

    let err = app
        .identity
        .request_email_verification(user.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_garbage_verification_token_is_not_found() {
    let app = TestApp::new().await;
    let err = app
        .identity
        .confirm_email_verification("not-a-real-token")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenNotFound);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new().await;
    let login = app
        .register_and_login("alice@example.com", "alice", "a-long-password")
        .await;

    let token = app
        .identity
        .request_password_reset("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    app.identity
        .confirm_password_reset(&token, "a-brand-new-password")
        .await
        .unwrap();

    // The old password is dead and every session is closed.
    let err = app
        .identity
        .login("alice", "a-long-password", &ClientMeta::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCredentials);

    let err = app
        .identity
        .authenticate(&login.tokens.access_token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::SessionRevoked);

    // The new password opens a fresh session.
    assert!(
        app.identity
            .login("alice", "a-brand-new-password", &ClientMeta::default())
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_password_reset_hides_unknown_identities() {
    let app = TestApp::new().await;
    app.identity
        .register("alice@example.com", "alice", "a-long-password")
        .await
        .unwrap();

    // Unknown identities get the same Ok as real ones, carrying no token.
    let outcome = app
        .identity
        .request_password_reset("nobody@example.com")
        .await
        .unwrap();
    assert!(outcome.is_none());

    let outcome = app
        .identity
        .request_password_reset("alice@example.com")
        .await
        .unwrap();
    assert!(outcome.is_some());
}

#[tokio::test]
async fn test_password_reset_skips_deactivated_accounts() {
    let app = TestApp::new().await;
    let login = app
        .register_and_login("alice@example.com", "alice", "a-long-password")
        .await;
    app.accounts.deactivate(login.user.id).await.unwrap();

    let outcome = app
        .identity
        .request_password_reset("alice@example.com")
        .await
        .unwrap();
    assert!(outcome.is_none());
}

#[tokio::test]
async fn test_rejected_password_leaves_reset_token_usable() {
    let app = TestApp::new().await;
    app.identity
        .register("alice@example.com", "alice", "a-long-password")
        .await
        .unwrap();

    let token = app
        .identity
        .request_password_reset("alice")
        .await
        .unwrap()
        .unwrap();

    // A too-short replacement fails the policy before the token is spent.
    let err = app
        .identity
        .confirm_password_reset(&token, "short")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    // The same token still completes the reset.
    app.identity
        .confirm_password_reset(&token, "an-acceptable-password")
        .await
        .unwrap();
    assert!(
        app.identity
            .login("alice", "an-acceptable-password", &ClientMeta::default())
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_concurrent_verification_has_one_winner() {
    let app = TestApp::new().await;
    let user = app
        .identity
        .register("alice@example.com", "alice", "a-long-password")
        .await
        .unwrap();
    let token = app
        .identity
        .request_email_verification(user.id)
        .await
        .unwrap();

    let attempts = futures::future::join_all(
        (0..4).map(|_| app.identity.confirm_email_verification(&token)),
    )
    .await;

    let winners = attempts.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in attempts.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind, ErrorKind::TokenAlreadyUsed);
    }

    let stored = app.users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.is_verified);
}

#[tokio::test]
async fn test_reset_token_rejected_as_verification_token() {
    let app = TestApp::new().await;
    app.identity
        .register("alice@example.com", "alice", "a-long-password")
        .await
        .unwrap();

    let reset_token = app
        .identity
        .request_password_reset("alice")
        .await
        .unwrap()
        .unwrap();

    // Kinds do not cross; the lookup misses entirely.
    let err = app
        .identity
        .confirm_email_verification(&reset_token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenNotFound);
}
