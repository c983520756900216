//! # taskforge-database
//!
//! PostgreSQL connection management, embedded migrations, and the store
//! implementations backing the Taskforge identity core. Each store trait
//! has two implementations: a `postgres` one for deployment and a
//! `memory` one for tests and single-node embedding.

pub mod connection;
pub mod migration;
pub mod stores;

pub use connection::DatabasePool;
pub use stores::{EphemeralTokenStore, RoleStore, SessionStore, UserStore};
