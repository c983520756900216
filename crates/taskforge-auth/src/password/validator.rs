//! Password policy enforcement for new passwords.

use taskforge_core::config::AuthConfig;
use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;

/// Validates new passwords against the configured acceptance policy.
///
/// Applied wherever a password enters the system: registration, password
/// change, and password reset.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a password against the configured policy.
    ///
    /// Returns `Ok(())` if the password meets all requirements,
    /// or an error describing the first violation found.
    pub fn validate(&self, password: &str) -> AppResult<()> {
        if password.is_empty() {
            return Err(AppError::validation("Password must not be empty"));
        }

        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        Ok(())
    }
}

impl Default for PasswordValidator {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}
