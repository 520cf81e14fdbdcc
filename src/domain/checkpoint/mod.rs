//! Checkpoint aggregate

pub mod model;
pub mod repository;

pub use model::Checkpoint;
pub use repository::CheckpointRepository;
