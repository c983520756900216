//! Shared test helpers wiring the identity stack over memory stores.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use taskforge_auth::credential::CredentialStore;
use taskforge_auth::ephemeral::EphemeralTokenManager;
use taskforge_auth::jwt::{JwtDecoder, JwtEncoder};
use taskforge_auth::password::{PasswordHasher, PasswordValidator};
use taskforge_auth::session::SessionRegistry;
use taskforge_core::config::{AuthConfig, EphemeralConfig, SessionConfig, TokenConfig};
use taskforge_database::stores::{
    MemoryEphemeralTokenStore, MemoryRoleStore, MemorySessionStore, MemoryUserStore, SessionStore,
};
use taskforge_entity::session::{ClientMeta, CreateSession};
use taskforge_service::{AccountService, IdentityService, LoginResult, RoleService};

fn token_config() -> TokenConfig {
    TokenConfig {
        secret: "integration-test-secret".to_string(),
        access_ttl_minutes: 30,
        refresh_ttl_days: 14,
    }
}

/// Fully wired identity stack over in-memory stores, with the stores
/// kept reachable for direct assertions.
#[allow(dead_code)]
pub struct TestApp {
    /// The identity facade under test.
    pub identity: IdentityService,
    /// Role administration.
    pub roles: RoleService,
    /// Account operations.
    pub accounts: AccountService,
    /// The user store behind everything.
    pub users: Arc<MemoryUserStore>,
    /// The session store behind the registry.
    pub sessions: Arc<MemorySessionStore>,
    /// The ephemeral token store behind the manager.
    pub tokens: Arc<MemoryEphemeralTokenStore>,
}

#[allow(dead_code)]
impl TestApp {
    /// Creates a wired stack with system roles seeded.
    pub async fn new() -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let role_store = Arc::new(MemoryRoleStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let tokens = Arc::new(MemoryEphemeralTokenStore::new());

        let token_config = token_config();

        let credentials = CredentialStore::new(
            users.clone(),
            PasswordHasher::new(),
            PasswordValidator::new(&AuthConfig::default()),
        );

        let registry = SessionRegistry::new(
            sessions.clone(),
            Arc::new(JwtEncoder::new(&token_config)),
            Arc::new(JwtDecoder::new(&token_config)),
            &SessionConfig { ttl_hours: 720 },
        );

        let ephemeral =
            EphemeralTokenManager::new(tokens.clone(), &EphemeralConfig::default());

        let identity = IdentityService::new(
            credentials.clone(),
            registry.clone(),
            ephemeral.clone(),
            users.clone(),
            role_store.clone(),
        );
        let roles = RoleService::new(role_store, users.clone());
        let accounts = AccountService::new(users.clone(), credentials, registry, ephemeral);

        roles
            .ensure_system_roles()
            .await
            .expect("Failed to seed system roles");

        Self {
            identity,
            roles,
            accounts,
            users,
            sessions,
            tokens,
        }
    }

    /// Registers a user and logs them in.
    pub async fn register_and_login(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> LoginResult {
        self.identity
            .register(email, username, password)
            .await
            .expect("Failed to register");
        self.identity
            .login(username, password, &ClientMeta::default())
            .await
            .expect("Failed to log in")
    }

    /// Seeds a session already past its absolute lifetime, returning its
    /// ID and an access token that is itself still within validity.
    pub async fn seed_expired_session(&self, user_id: Uuid) -> (Uuid, String) {
        let encoder = JwtEncoder::new(&token_config());
        let session_id = Uuid::new_v4();
        let issued = encoder
            .generate_token_pair(user_id, session_id)
            .expect("Failed to mint tokens");

        self.sessions
            .create(&CreateSession {
                id: session_id,
                user_id,
                access_token_id: issued.access_token_id,
                refresh_token_id: issued.refresh_token_id,
                ip_address: None,
                user_agent: None,
                expires_at: Utc::now() - Duration::hours(1),
            })
            .await
            .expect("Failed to seed session");

        (session_id, issued.tokens.access_token)
    }
}
