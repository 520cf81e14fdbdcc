//! Cryptographic primitives: password digests and signed tokens.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtConfig, TokenError, TokenKind, TokenService};
pub use password::{validate_password_strength, PasswordError, PasswordHasher};
