//! Repository traits for the domain layer
//!
//! `RepositoryProvider` is the Directory Store seam: services receive one
//! injected provider and request only the repository they need.
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) {
//!     let user = repos.users().find_by_id("user-op-east").await?;
//!     let entries = repos.entries().list(&EntryQuery::all()).await?;
//! }
//! ```

use super::checkpoint::CheckpointRepository;
use super::credential::CredentialRepository;
use super::entry::EntryRepository;
use super::user::UserRepository;

pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn checkpoints(&self) -> &dyn CheckpointRepository;
    fn entries(&self) -> &dyn EntryRepository;
    fn credentials(&self) -> &dyn CredentialRepository;
}
