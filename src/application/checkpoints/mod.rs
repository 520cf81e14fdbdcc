pub mod service;

pub use service::{CheckpointChanges, CheckpointService};
