//! Feature modules: one directory per resource, DTOs next to handlers

pub mod auth;
pub mod checkpoints;
pub mod health;
pub mod metrics;
pub mod rate_limit;
pub mod request_id;
pub mod supervisor;
pub mod sync;
pub mod users;
