//! User aggregate model

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Access level of a user.
///
/// Closed set: every authorization decision matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Supervisor,
    GateOperator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Supervisor => "SUPERVISOR",
            Self::GateOperator => "GATE_OPERATOR",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "SUPERVISOR" => Ok(Self::Supervisor),
            "GATE_OPERATOR" => Ok(Self::GateOperator),
            other => Err(DomainError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// An account that can authenticate against the API.
///
/// `managed_operators` is never persisted: repositories derive it from the
/// operators whose `supervisor_id` points at this user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
    /// Checkpoint allowlist. Empty means "all checkpoints" for Admin and
    /// Supervisor, and "none" for a GateOperator.
    pub allowed_checkpoints: BTreeSet<String>,
    /// Set only for GateOperators
    pub supervisor_id: Option<String>,
    /// Derived, set only for Supervisors
    pub managed_operators: BTreeSet<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role,
            allowed_checkpoints: BTreeSet::new(),
            supervisor_id: None,
            managed_operators: BTreeSet::new(),
            last_login: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_checkpoints<I, S>(mut self, checkpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_checkpoints = checkpoints.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_supervisor(mut self, supervisor_id: impl Into<String>) -> Self {
        self.supervisor_id = Some(supervisor_id.into());
        self
    }

    pub fn manages(&self, operator_id: &str) -> bool {
        self.managed_operators.contains(operator_id)
    }
}
