//! Sync module: offline client push and delta pull

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
