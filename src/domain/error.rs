//! Domain errors

use thiserror::Error;

/// Error taxonomy shared by every repository and service.
///
/// Each variant maps onto exactly one HTTP status at the interface layer
/// (see `interfaces::http::common::ApiError`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input (400)
    #[error("Validation: {0}")]
    Validation(String),

    /// Bad credentials, invalid or expired token (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity does not exist (404)
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Uniqueness violation (409)
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Store or infrastructure failure (500)
    #[error("Internal: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Message safe to hand back to a caller.
    ///
    /// Internal failures never leak their detail.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::NotFound { entity, .. } => format!("{} not found", entity),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
