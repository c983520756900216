//! Signed token creation and validation.
//!
//! Signing is HMAC-SHA256 via `jsonwebtoken`; everything outside this
//! module treats token strings as opaque. Decoding is pure: it checks
//! signature, expiry, and token type, and never touches storage.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::{IssuedTokenPair, JwtEncoder};
