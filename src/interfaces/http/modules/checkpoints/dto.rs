//! Checkpoint DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::CheckpointChanges;
use crate::domain::Checkpoint;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CheckpointDto {
    pub checkpoint_id: String,
    pub name: String,
    pub location: String,
}

impl From<Checkpoint> for CheckpointDto {
    fn from(c: Checkpoint) -> Self {
        Self {
            checkpoint_id: c.checkpoint_id,
            name: c.name,
            location: c.location,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCheckpointRequest {
    #[validate(length(min = 1, max = 64, message = "Checkpoint ID and name are required"))]
    pub checkpoint_id: String,
    #[validate(length(min = 1, max = 128, message = "Checkpoint ID and name are required"))]
    pub name: String,
    #[serde(default)]
    pub location: String,
}

impl From<CreateCheckpointRequest> for Checkpoint {
    fn from(r: CreateCheckpointRequest) -> Self {
        Checkpoint::new(r.checkpoint_id, r.name, r.location)
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCheckpointRequest {
    pub name: Option<String>,
    pub location: Option<String>,
}

impl From<UpdateCheckpointRequest> for CheckpointChanges {
    fn from(r: UpdateCheckpointRequest) -> Self {
        Self {
            name: r.name,
            location: r.location,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckpointListResponse {
    pub checkpoints: Vec<CheckpointDto>,
    pub count: usize,
}
