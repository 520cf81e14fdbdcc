//! Entry aggregate

pub mod model;
pub mod repository;

pub use model::{Entry, EntryStatus, EntrySubmission, EntryType};
pub use repository::{EntryQuery, EntryRepository};
