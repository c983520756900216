//! Credential registration and verification.

pub mod store;

pub use store::CredentialStore;
