//! PostgreSQL store implementations.

pub mod role;
pub mod session;
pub mod token;
pub mod user;

pub use role::PostgresRoleStore;
pub use session::PostgresSessionStore;
pub use token::PostgresEphemeralTokenStore;
pub use user::PostgresUserStore;
