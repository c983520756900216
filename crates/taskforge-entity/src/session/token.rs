//! Token value types for signed access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pair of signed tokens returned on login and refresh.
///
/// Tokens cross the service boundary as opaque strings; nothing outside
/// the token layer inspects their structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// The signed access token.
    pub access_token: String,
    /// The signed refresh token.
    pub refresh_token: String,
    /// When the access token expires.
    pub access_expires_at: DateTime<Utc>,
    /// When the refresh token expires.
    pub refresh_expires_at: DateTime<Utc>,
}
