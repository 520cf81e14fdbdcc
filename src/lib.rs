//! # GateKeeper API
//!
//! Central backend for checkpoint logging: role-based access control over
//! users, checkpoints and entries, plus offline delta sync for field clients.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: entities, error taxonomy and repository traits
//! - **application**: access control, sync reconciliation and administration use cases
//! - **infrastructure**: password hashing, tokens, SQLite and in-memory stores, rate limiter
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export storage entry points for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryStore, SeaOrmRepositoryProvider};

// Re-export API router
pub use interfaces::http::{create_api_router, AppState, RouterOptions};
