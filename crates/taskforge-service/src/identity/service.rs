//! The identity service, the single entry point for a request layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use taskforge_auth::credential::CredentialStore;
use taskforge_auth::ephemeral::EphemeralTokenManager;
use taskforge_auth::rbac::PermissionSet;
use taskforge_auth::session::SessionRegistry;
use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;
use taskforge_database::stores::{RoleStore, UserStore};
use taskforge_entity::session::{ClientMeta, Session, TokenPair};
use taskforge_entity::user::User;

use crate::context::AuthContext;
use crate::role::DEFAULT_ROLE;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// The authenticated user.
    pub user: User,
    /// The newly opened session.
    pub session: Session,
    /// The first token pair for the session.
    pub tokens: TokenPair,
}

/// Orchestrates credentials, sessions, roles, and ephemeral tokens into
/// the operations a request-handling layer consumes.
///
/// Tokens cross this boundary as opaque strings; delivery of
/// verification and reset token values (email, etc.) is the caller's
/// concern.
#[derive(Clone)]
pub struct IdentityService {
    /// Credential registration and verification.
    credentials: CredentialStore,
    /// Session lifecycle.
    registry: SessionRegistry,
    /// Single-use verification and reset tokens.
    ephemeral: EphemeralTokenManager,
    /// User persistence.
    users: Arc<dyn UserStore>,
    /// Role persistence.
    roles: Arc<dyn RoleStore>,
}

impl std::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityService").finish_non_exhaustive()
    }
}

impl IdentityService {
    /// Creates a new identity service.
    pub fn new(
        credentials: CredentialStore,
        registry: SessionRegistry,
        ephemeral: EphemeralTokenManager,
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            credentials,
            registry,
            ephemeral,
            users,
            roles,
        }
    }

    /// Registers a new user and grants the default role.
    ///
    /// The account starts active and unverified; callers follow up with
    /// [`request_email_verification`](Self::request_email_verification)
    /// to begin verification.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> AppResult<User> {
        let user = self.credentials.register(email, username, password).await?;

        // Grant the default role when it is seeded.
        match self.roles.find_by_name(DEFAULT_ROLE).await? {
            Some(role) => self.roles.assign(user.id, role.id).await?,
            None => {
                debug!(user_id = %user.id, "Default role not present; registering without roles")
            }
        }

        Ok(user)
    }

    /// Verifies credentials and opens a session.
    ///
    /// All credential failures surface as `InvalidCredentials`. The
    /// last-login timestamp is updated best-effort; a failure there is
    /// logged, not surfaced.
    pub async fn login(
        &self,
        identity: &str,
        password: &str,
        meta: &ClientMeta,
    ) -> AppResult<LoginResult> {
        // Step 1: verify credentials.
        let user = self.credentials.verify_password(identity, password).await?;

        // Step 2: open the session and mint the first token pair.
        let (session, tokens) = self.registry.open(user.id, meta).await?;

        // Step 3: record the login time.
        if let Err(e) = self.users.touch_last_login(user.id).await {
            warn!(user_id = %user.id, error = %e, "Failed to record last login");
        }

        info!(user_id = %user.id, session_id = %session.id, "User logged in");
        Ok(LoginResult {
            user,
            session,
            tokens,
        })
    }

    /// Authenticates an access token into a full request context.
    ///
    /// Token and session failures keep their distinct error kinds. A
    /// session whose user has since been deactivated or removed is
    /// closed on sight and reported as `SessionRevoked`.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<AuthContext> {
        // Step 1: token signature/expiry and session liveness.
        let (claims, session) = self.registry.authenticate(access_token).await?;

        // Step 2: the user behind the session must still be active.
        let user = self.users.find_by_id(session.user_id).await?;
        let active = user.map(|u| u.is_active).unwrap_or(false);
        if !active {
            self.registry.close(session.id).await?;
            return Err(AppError::session_revoked("Session has been revoked"));
        }

        // Step 3: resolve roles and permissions as of now.
        self.resolve_context(session.user_id, claims.session_id())
            .await
    }

    /// Checks whether an authenticated context grants an action.
    pub fn authorize(&self, ctx: &AuthContext, action: &str) -> bool {
        ctx.authorize(action)
    }

    /// Exchanges a refresh token for a fresh pair on the same session.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(Session, TokenPair)> {
        self.registry.refresh(refresh_token).await
    }

    /// Closes a session. Idempotent.
    pub async fn logout(&self, session_id: Uuid) -> AppResult<bool> {
        self.registry.close(session_id).await
    }

    /// Closes every session a user holds. Returns the count.
    pub async fn logout_all(&self, user_id: Uuid) -> AppResult<u64> {
        self.registry.close_all(user_id).await
    }

    /// Issues an email verification token for an unverified user.
    ///
    /// Returns the opaque token value for the caller to deliver.
    pub async fn request_email_verification(&self, user_id: Uuid) -> AppResult<String> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if user.is_verified {
            return Err(AppError::conflict("Email is already verified"));
        }

        self.ephemeral.issue_verification(user.id).await
    }

    /// Consumes a verification token and marks its owner verified.
    ///
    /// Returns the verified user's ID.
    pub async fn confirm_email_verification(&self, token: &str) -> AppResult<Uuid> {
        let user_id = self.ephemeral.consume_verification(token).await?;
        self.credentials.mark_verified(user_id).await?;
        Ok(user_id)
    }

    /// Issues a password reset token for the account matching
    /// `identity`, if one exists and is active.
    ///
    /// Returns `Ok(None)` for unknown or deactivated identities so the
    /// caller can respond identically either way and reveal nothing
    /// about which accounts exist.
    pub async fn request_password_reset(&self, identity: &str) -> AppResult<Option<String>> {
        let user = self.credentials.find_by_identity(identity).await?;

        let Some(user) = user.filter(|u| u.is_active) else {
            info!("Password reset requested for unknown or inactive identity");
            return Ok(None);
        };

        let value = self.ephemeral.issue_reset(user.id).await?;
        Ok(Some(value))
    }

    /// Consumes a reset token and replaces the owner's password.
    ///
    /// The new password is checked against the acceptance policy before
    /// the token is spent, so a rejected password leaves the token
    /// usable. Every live session of the user is closed before the call
    /// returns.
    pub async fn confirm_password_reset(&self, token: &str, new_password: &str) -> AppResult<()> {
        // Step 1: policy check first; consumption is irreversible.
        self.credentials.validate_password(new_password)?;

        // Step 2: spend the token.
        let user_id = self.ephemeral.consume_reset(token).await?;

        // Step 3: store the new hash, then invalidate the sessions it
        // replaces before acknowledging.
        self.credentials.set_password(user_id, new_password).await?;
        self.registry.close_all(user_id).await?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }

    async fn resolve_context(&self, user_id: Uuid, session_id: Uuid) -> AppResult<AuthContext> {
        let roles = self.roles.roles_for_user(user_id).await?;
        let names = roles.iter().map(|role| role.name.clone()).collect();

        Ok(AuthContext {
            user_id,
            session_id,
            roles: names,
            permissions: PermissionSet::from_roles(&roles),
        })
    }
}
