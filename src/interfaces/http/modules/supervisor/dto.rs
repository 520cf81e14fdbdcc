//! Supervisor DTOs

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntryFilterParams {
    /// Only entries logged at this checkpoint
    pub checkpoint_id: Option<String>,
}

/// Strength rules are enforced by the service so the message is uniform.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,
    pub new_password: String,
}
