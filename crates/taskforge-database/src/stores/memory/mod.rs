//! In-memory store implementations.
//!
//! Suitable for tests and single-node embedding. The user and role
//! stores serialize writes behind a Tokio mutex because uniqueness
//! checks span the whole map; the session and token stores rely on
//! `DashMap` shard locking for their per-entry compare-and-swap.

pub mod role;
pub mod session;
pub mod token;
pub mod user;

pub use role::MemoryRoleStore;
pub use session::MemorySessionStore;
pub use token::MemoryEphemeralTokenStore;
pub use user::MemoryUserStore;
