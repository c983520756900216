//! # taskforge-auth
//!
//! The identity core of the Taskforge platform: credential verification,
//! signed token issuance, session lifecycle, permission evaluation, and
//! single-use tokens for email verification and password reset.
//!
//! ## Modules
//!
//! - `password` — Argon2id password hashing and policy enforcement
//! - `jwt` — signed access/refresh token creation and validation
//! - `credential` — registration and password verification over the user store
//! - `session` — session lifecycle (open, authenticate, refresh, close)
//! - `rbac` — pure pattern-based permission evaluation
//! - `ephemeral` — single-use verification and reset tokens

pub mod credential;
pub mod ephemeral;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use credential::CredentialStore;
pub use ephemeral::EphemeralTokenManager;
pub use jwt::{Claims, IssuedTokenPair, JwtDecoder, JwtEncoder, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::PermissionSet;
pub use session::SessionRegistry;
