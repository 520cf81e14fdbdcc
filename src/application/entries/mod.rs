//! Entry review and export

pub mod export;
pub mod service;

pub use export::{entries_to_csv, export_filename};
pub use service::{CsvExport, EntryService};
