//! Account self-service and administrative account state.

pub mod service;

pub use service::AccountService;
