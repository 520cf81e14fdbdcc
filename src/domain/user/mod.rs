//! User aggregate
//!
//! Contains the User entity, its role and the repository interface.

pub mod model;
pub mod repository;

pub use model::{User, UserRole};
pub use repository::UserRepository;
