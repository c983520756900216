//! Ephemeral token kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The purpose of a single-use token. Each kind has its own TTL policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ephemeral_token_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Confirms ownership of an email address.
    Verification,
    /// Authorizes a password reset without the current password.
    PasswordReset,
}

impl TokenKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = taskforge_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verification" => Ok(Self::Verification),
            "password_reset" => Ok(Self::PasswordReset),
            _ => Err(taskforge_core::AppError::validation(format!(
                "Invalid token kind: '{s}'. Expected one of: verification, password_reset"
            ))),
        }
    }
}
