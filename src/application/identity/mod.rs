//! Identity module: authentication & user administration

pub mod service;

pub use service::{AccessGrant, LoginResult, NewUser, UserChanges, UserService};
