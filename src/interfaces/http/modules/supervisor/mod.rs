//! Supervisor module: entry review, export and operator password reset

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
