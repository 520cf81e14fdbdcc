//! HTTP REST API
//!
//! - `common`: error envelope, `ApiError` mapping and the validated JSON extractor
//! - `middleware`: bearer authentication and role scopes
//! - `modules`: one module per resource (DTOs + handlers)
//! - `router`: route table, middleware stack and Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, AppState, RouterOptions};
