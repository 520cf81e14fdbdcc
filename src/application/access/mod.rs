//! Access Control Engine
//!
//! `policy` holds the pure read/write/management decisions; `supervision`
//! keeps the operator to supervisor edge valid across user mutations.

pub mod policy;
pub mod supervision;

pub use policy::{
    authorize_password_reset, authorize_push, authorize_user_deletion, can_view,
    visible_entries, PushRejection, Scope,
};
