//! Single-use verification and password reset tokens.

pub mod manager;

pub use manager::EphemeralTokenManager;
