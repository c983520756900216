//! Credential store: registration and password verification.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_database::stores::UserStore;
use taskforge_entity::user::{CreateUser, User};

use crate::password::{PasswordHasher, PasswordValidator};

/// Manages user credentials on top of the user store.
///
/// This layer knows nothing about tokens or sessions. Every failure mode
/// of [`verify_password`](CredentialStore::verify_password) — unknown
/// identity, wrong password, deactivated account — collapses into the
/// same `InvalidCredentials` error so callers cannot probe which
/// accounts exist.
#[derive(Clone)]
pub struct CredentialStore {
    /// User persistence.
    users: Arc<dyn UserStore>,
    /// Argon2id hasher.
    hasher: PasswordHasher,
    /// Password acceptance policy.
    validator: PasswordValidator,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("validator", &self.validator)
            .finish()
    }
}

impl CredentialStore {
    /// Creates a new credential store.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        validator: PasswordValidator,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
        }
    }

    /// Registers a new user with a hashed password.
    ///
    /// The account starts active and unverified. Fails with
    /// `DuplicateIdentity` if the email or username is already taken
    /// (case-insensitively).
    pub async fn register(&self, email: &str, username: &str, password: &str) -> AppResult<User> {
        let email = email.trim();
        let username = username.trim();

        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid email address is required"));
        }
        if username.is_empty() {
            return Err(AppError::validation("Username must not be empty"));
        }
        if username.contains('@') {
            return Err(AppError::validation("Username must not contain '@'"));
        }

        self.validator.validate(password)?;
        let password_hash = self.hasher.hash_password(password)?;

        let user = self
            .users
            .create(&CreateUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Looks up the account matching `identity`.
    ///
    /// The identity may be an email address or a username; values
    /// containing `@` are treated as emails.
    pub async fn find_by_identity(&self, identity: &str) -> AppResult<Option<User>> {
        let identity = identity.trim();
        if identity.contains('@') {
            self.users.find_by_email(identity).await
        } else {
            self.users.find_by_username(identity).await
        }
    }

    /// Verifies a password against the account matching `identity`.
    ///
    /// Returns the user on success. Unknown identity, deactivated
    /// account, and password mismatch are indistinguishable to the
    /// caller.
    pub async fn verify_password(&self, identity: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.find_by_identity(identity).await? else {
            warn!("Password verification failed: unknown identity");
            return Err(AppError::invalid_credentials());
        };

        if !user.is_active {
            warn!(user_id = %user.id, "Password verification failed: account deactivated");
            return Err(AppError::invalid_credentials());
        }

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Password verification failed: mismatch");
            return Err(AppError::invalid_credentials());
        }

        Ok(user)
    }

    /// Checks a candidate password against the acceptance policy
    /// without storing anything.
    ///
    /// Lets flows that spend a single-use token validate the new
    /// password before the token is consumed.
    pub fn validate_password(&self, password: &str) -> AppResult<()> {
        self.validator.validate(password)
    }

    /// Verifies a plaintext password against an already loaded user's
    /// stored hash. Returns `InvalidCredentials` on mismatch.
    pub fn verify_current(&self, user: &User, password: &str) -> AppResult<()> {
        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Current password verification failed");
            return Err(AppError::invalid_credentials());
        }
        Ok(())
    }

    /// Replaces a user's password with a freshly hashed one.
    ///
    /// Validates the new password against the acceptance policy first.
    /// Callers that hold live sessions for the user are responsible for
    /// closing them.
    pub async fn set_password(&self, user_id: Uuid, new_password: &str) -> AppResult<()> {
        self.validator.validate(new_password)?;
        let password_hash = self.hasher.hash_password(new_password)?;
        self.users.update_password(user_id, &password_hash).await?;

        info!(user_id = %user_id, "Password updated");
        Ok(())
    }

    /// Marks a user's email as verified. Idempotent.
    pub async fn mark_verified(&self, user_id: Uuid) -> AppResult<()> {
        self.users.set_verified(user_id, true).await?;
        info!(user_id = %user_id, "Email verified");
        Ok(())
    }
}
