//! JWT token handling
//!
//! Access and refresh tokens share one claim set and differ by `typ` and
//! lifetime. Validation is pinned to HS256: a token whose header names any
//! other algorithm is refused before its signature is looked at.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DomainError, User, UserRole};

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Issuer claim
    pub issuer: String,
    /// Lifetime of access tokens
    pub access_ttl: Duration,
    /// Lifetime of refresh tokens
    pub refresh_ttl: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-secret-key".to_string(),
            issuer: "gatekeeper-api".to_string(),
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    pub typ: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    pub iss: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid authentication token")]
    Invalid,
    #[error("Token has expired")]
    Expired,
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for DomainError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(msg) => DomainError::Internal(msg),
            other => DomainError::Unauthorized(other.to_string()),
        }
    }
}

/// Issues and validates signed tokens.
#[derive(Clone)]
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl.num_seconds()
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, TokenError> {
        self.issue(user, TokenKind::Access, self.config.access_ttl)
    }

    pub fn issue_refresh_token(&self, user: &User) -> Result<String, TokenError> {
        self.issue(user, TokenKind::Refresh, self.config.refresh_ttl)
    }

    /// Verify signature, issuer, expiry and token kind.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.typ != expected {
            return Err(TokenError::Invalid);
        }
        Ok(data.claims)
    }

    fn issue(&self, user: &User, typ: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.user_id.clone(),
            username: user.username.clone(),
            role: user.role,
            typ,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
