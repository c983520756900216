//! Role administration.

pub mod service;

pub use service::{DEFAULT_ROLE, RoleService};
