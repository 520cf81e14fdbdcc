//! Database entities module

pub mod checkpoint;
pub mod credential;
pub mod entry;
pub mod user;

pub use checkpoint::Entity as Checkpoint;
pub use credential::Entity as Credential;
pub use entry::Entity as Entry;
pub use user::Entity as User;
