//! # taskforge-service
//!
//! Application-level services over the identity core. Each service
//! orchestrates the credential store, session registry, permission
//! evaluator, and persistence stores to implement the operations a
//! request-handling layer consumes.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references or cheap handles.

pub mod account;
pub mod context;
pub mod identity;
pub mod role;

pub use account::AccountService;
pub use context::AuthContext;
pub use identity::{IdentityService, LoginResult};
pub use role::RoleService;
