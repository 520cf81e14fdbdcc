pub mod service;

pub use service::{PushOutcome, SyncService};
