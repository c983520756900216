//! Unified application error types for Taskforge.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Login rejected. Deliberately covers both unknown identity and wrong
    /// password so callers cannot probe which accounts exist.
    InvalidCredentials,
    /// Registration or profile update collided with an existing email or
    /// username.
    DuplicateIdentity,
    /// A signed token was presented past its expiry instant.
    TokenExpired,
    /// A signed token failed signature or structural validation.
    TokenInvalid,
    /// An ephemeral token was redeemed a second time.
    TokenAlreadyUsed,
    /// An ephemeral token value is unknown to the system.
    TokenNotFound,
    /// The session outlived its absolute lifetime.
    SessionExpired,
    /// The session was closed by logout, cascade, or sweep.
    SessionRevoked,
    /// The caller's roles do not grant the attempted action.
    PermissionDenied,
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (concurrent modification, protected resource).
    Conflict,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::DuplicateIdentity => write!(f, "DUPLICATE_IDENTITY"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::TokenInvalid => write!(f, "TOKEN_INVALID"),
            Self::TokenAlreadyUsed => write!(f, "TOKEN_ALREADY_USED"),
            Self::TokenNotFound => write!(f, "TOKEN_NOT_FOUND"),
            Self::SessionExpired => write!(f, "SESSION_EXPIRED"),
            Self::SessionRevoked => write!(f, "SESSION_REVOKED"),
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Taskforge.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. Every kind in the taxonomy is recoverable
/// at the request layer; nothing here is expected to abort the process.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-credentials error.
    ///
    /// The message is the same for every credential failure; the caller
    /// must not leak whether the identity exists.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid credentials")
    }

    /// Create a duplicate-identity error.
    pub fn duplicate_identity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateIdentity, message)
    }

    /// Create a token-expired error.
    pub fn token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExpired, message)
    }

    /// Create a token-invalid error.
    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    /// Create a token-already-used error.
    pub fn token_already_used(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenAlreadyUsed, message)
    }

    /// Create a token-not-found error.
    pub fn token_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenNotFound, message)
    }

    /// Create a session-expired error.
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionExpired, message)
    }

    /// Create a session-revoked error.
    pub fn session_revoked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionRevoked, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::session_revoked("session gone");
        assert_eq!(err.to_string(), "SESSION_REVOKED: session gone");
    }

    #[test]
    fn test_invalid_credentials_message_is_uniform() {
        assert_eq!(
            AppError::invalid_credentials().to_string(),
            AppError::invalid_credentials().to_string()
        );
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        let err = AppError::with_source(ErrorKind::Database, "query failed", io);
        let cloned = err.clone();
        assert!(err.source.is_some());
        assert!(cloned.source.is_none());
        assert_eq!(cloned.kind, ErrorKind::Database);
    }
}
