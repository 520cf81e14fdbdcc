//! Domain layer: entities, error taxonomy and repository interfaces.

pub mod checkpoint;
pub mod credential;
pub mod entry;
pub mod error;
pub mod repositories;
pub mod user;

pub use checkpoint::{Checkpoint, CheckpointRepository};
pub use credential::{CredentialRecord, CredentialRepository};
pub use entry::{Entry, EntryQuery, EntryRepository, EntryStatus, EntrySubmission, EntryType};
pub use error::{DomainError, DomainResult};
pub use repositories::RepositoryProvider;
pub use user::{User, UserRepository, UserRole};
