//! Ephemeral token domain entities.

pub mod kind;
pub mod model;

pub use kind::TokenKind;
pub use model::{CreateEphemeralToken, EphemeralToken};
