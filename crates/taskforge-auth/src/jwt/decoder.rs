//! Signed token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use taskforge_core::config::TokenConfig;
use taskforge_core::error::AppError;
use taskforge_core::result::AppResult;

use super::claims::{Claims, TokenType};

/// Validates signed tokens.
///
/// Validation is a pure function of the token string and the current
/// clock: signature, expiry, and token type. Session liveness is the
/// registry's concern, not the decoder's.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from token configuration.
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0; // expiry is enforced to the second

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decode_token(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::token_invalid(
                "Invalid token type: expected access token",
            ));
        }

        Ok(claims)
    }

    /// Decodes and validates a refresh token string.
    pub fn decode_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.decode_token(token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::token_invalid(
                "Invalid token type: expected refresh token",
            ));
        }

        Ok(claims)
    }

    /// Internal decode without type checking.
    fn decode_token(&self, token: &str) -> AppResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::token_expired("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::token_invalid("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::token_invalid("Invalid token signature")
                    }
                    _ => AppError::token_invalid(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}
