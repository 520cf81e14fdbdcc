//! User DTOs

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::{NewUser, UserChanges};
use crate::domain::{User, UserRole};

/// User API representation. Credentials never leave the server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub user_id: String,
    pub username: String,
    #[schema(value_type = String, example = "GATE_OPERATOR")]
    pub role: UserRole,
    pub allowed_checkpoints: Vec<String>,
    pub supervisor_id: Option<String>,
    /// Derived from the operators whose `supervisor_id` points here
    pub managed_operators: Vec<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            username: u.username,
            role: u.role,
            allowed_checkpoints: u.allowed_checkpoints.into_iter().collect(),
            supervisor_id: u.supervisor_id,
            managed_operators: u.managed_operators.into_iter().collect(),
            last_login: u.last_login,
            created_at: u.created_at,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    pub password: String,
    #[schema(value_type = String, example = "GATE_OPERATOR")]
    pub role: UserRole,
    #[serde(default)]
    pub allowed_checkpoints: Vec<String>,
    #[serde(default)]
    pub supervisor_id: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            username: r.username,
            password: r.password,
            role: r.role,
            allowed_checkpoints: r.allowed_checkpoints.into_iter().collect::<BTreeSet<_>>(),
            supervisor_id: r.supervisor_id,
        }
    }
}

/// Update user request. Absent fields are left unchanged; an empty
/// `supervisor_id` string detaches the operator.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(value_type = Option<String>, example = "SUPERVISOR")]
    pub role: Option<UserRole>,
    pub allowed_checkpoints: Option<Vec<String>>,
    pub supervisor_id: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            role: r.role,
            allowed_checkpoints: r
                .allowed_checkpoints
                .map(|ids| ids.into_iter().collect::<BTreeSet<_>>()),
            supervisor_id: r.supervisor_id,
        }
    }
}

/// `GET /admin/users` body
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserDto>,
    pub count: usize,
}
