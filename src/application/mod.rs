//! Application layer: use cases over the domain repositories

pub mod access;
pub mod checkpoints;
pub mod entries;
pub mod identity;
pub mod seed;
pub mod sync;

pub use checkpoints::{CheckpointChanges, CheckpointService};
pub use entries::{CsvExport, EntryService};
pub use identity::{AccessGrant, LoginResult, NewUser, UserChanges, UserService};
pub use sync::{PushOutcome, SyncService};
