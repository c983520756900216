//! Account operations — profile, password change, deactivation.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use taskforge_auth::credential::CredentialStore;
use taskforge_auth::ephemeral::EphemeralTokenManager;
use taskforge_auth::session::SessionRegistry;
use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_database::stores::UserStore;
use taskforge_entity::user::{UpdateProfile, User};

/// Handles account self-service and administrative activation state.
///
/// Self-service operations act on the caller's own user ID as resolved
/// by authentication; the deactivate/reactivate pair is for
/// administrative callers, gated by `users.update` or equivalent at the
/// request layer.
#[derive(Clone)]
pub struct AccountService {
    /// User persistence.
    users: Arc<dyn UserStore>,
    /// Credential verification and password updates.
    credentials: CredentialStore,
    /// Session lifecycle, for invalidation cascades.
    registry: SessionRegistry,
    /// Ephemeral tokens, for the deactivation cascade.
    ephemeral: EphemeralTokenManager,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        users: Arc<dyn UserStore>,
        credentials: CredentialStore,
        registry: SessionRegistry,
        ephemeral: EphemeralTokenManager,
    ) -> Self {
        Self {
            users,
            credentials,
            registry,
            ephemeral,
        }
    }

    /// Loads a user's full profile.
    pub async fn profile(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates profile fields. `None` fields are left untouched.
    ///
    /// Uniqueness is re-checked at the store; a conflicting email or
    /// username fails with `DuplicateIdentity`. Changing the email
    /// resets the verified flag.
    pub async fn update_profile(&self, user_id: Uuid, data: UpdateProfile) -> AppResult<User> {
        if let Some(email) = data.email.as_deref() {
            if email.trim().is_empty() || !email.contains('@') {
                return Err(AppError::validation("A valid email address is required"));
            }
        }
        if let Some(username) = data.username.as_deref() {
            if username.trim().is_empty() {
                return Err(AppError::validation("Username must not be empty"));
            }
            if username.contains('@') {
                return Err(AppError::validation("Username must not contain '@'"));
            }
        }

        // Existence check keeps NotFound distinct from conflicts below.
        self.profile(user_id).await?;

        let user = self.users.update_profile(user_id, &data).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Changes a user's password after verifying the current one.
    ///
    /// Fails with `InvalidCredentials` when the current password does
    /// not match. On success every live session of the user is closed
    /// before the call returns; the caller logs in again.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.profile(user_id).await?;

        // Step 1: the caller must prove they know the current password.
        self.credentials.verify_current(&user, current_password)?;

        // Step 2: store the new hash, then invalidate open sessions.
        self.credentials.set_password(user.id, new_password).await?;
        self.registry.close_all(user.id).await?;

        info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Deactivates an account, cascading over its live state: all
    /// sessions are closed and all ephemeral tokens revoked before the
    /// call returns. The account can be reactivated later.
    pub async fn deactivate(&self, user_id: Uuid) -> AppResult<()> {
        self.users.set_active(user_id, false).await?;

        let sessions = self.registry.close_all(user_id).await?;
        let tokens = self.ephemeral.revoke_all_for_user(user_id).await?;

        info!(
            user_id = %user_id,
            sessions = sessions,
            tokens = tokens,
            "Account deactivated"
        );
        Ok(())
    }

    /// Reactivates a previously deactivated account. The user logs in
    /// fresh; nothing revoked at deactivation comes back.
    pub async fn reactivate(&self, user_id: Uuid) -> AppResult<()> {
        self.users.set_active(user_id, true).await?;
        info!(user_id = %user_id, "Account reactivated");
        Ok(())
    }
}
