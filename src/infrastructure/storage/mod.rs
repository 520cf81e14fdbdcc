//! Storage implementations that live outside the relational database

mod memory;

pub use memory::InMemoryStore;
