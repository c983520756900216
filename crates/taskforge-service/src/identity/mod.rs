//! Identity facade: login, authentication, and account recovery flows.

pub mod service;

pub use service::{IdentityService, LoginResult};
