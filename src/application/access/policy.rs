//! Authorization decisions over entries and administrative actions
//!
//! Pure functions of the requester's role and relationships. Every decision
//! matches exhaustively on [`UserRole`], so a new role cannot slip through
//! without a compile error here.

use std::fmt;

use crate::domain::{DomainError, DomainResult, Entry, EntrySubmission, User, UserRole};

/// Whether `viewer` may read `entry`.
pub fn can_view(viewer: &User, entry: &Entry) -> bool {
    match viewer.role {
        UserRole::Admin => true,
        // Empty managed set sees nothing, never everything
        UserRole::Supervisor => viewer.managed_operators.contains(&entry.logging_user_id),
        UserRole::GateOperator => entry.logging_user_id == viewer.user_id,
    }
}

/// The subset of `entries` visible to `viewer`, order preserved.
pub fn visible_entries(entries: Vec<Entry>, viewer: &User) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|entry| can_view(viewer, entry))
        .collect()
}

/// Why a pushed entry was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushRejection {
    MissingRecordId,
    /// `logging_user_id` names someone other than the requester
    ForeignAuthor { claimed: String },
    CheckpointNotAllowed { checkpoint_id: String },
}

impl fmt::Display for PushRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRecordId => f.write_str("missing record_id"),
            Self::ForeignAuthor { claimed } => {
                write!(f, "entry attributed to another user ({})", claimed)
            }
            Self::CheckpointNotAllowed { checkpoint_id } => {
                write!(f, "checkpoint {} not in allowlist", checkpoint_id)
            }
        }
    }
}

/// Write authorization for one pushed entry.
pub fn authorize_push(requester: &User, entry: &EntrySubmission) -> Result<(), PushRejection> {
    if entry.record_id.trim().is_empty() {
        return Err(PushRejection::MissingRecordId);
    }
    if entry.logging_user_id != requester.user_id {
        return Err(PushRejection::ForeignAuthor {
            claimed: entry.logging_user_id.clone(),
        });
    }

    match requester.role {
        UserRole::GateOperator if !requester.allowed_checkpoints.contains(&entry.checkpoint_id) => {
            Err(PushRejection::CheckpointNotAllowed {
                checkpoint_id: entry.checkpoint_id.clone(),
            })
        }
        UserRole::GateOperator | UserRole::Supervisor | UserRole::Admin => Ok(()),
    }
}

/// Groups of endpoints sharing one role requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Push and pull, open to every role
    Sync,
    /// Entry review, export and password reset
    Review,
    /// User and checkpoint management
    Administration,
}

impl Scope {
    pub fn permits(self, role: UserRole) -> bool {
        match (self, role) {
            (Scope::Sync, _) => true,
            (Scope::Review, UserRole::Admin | UserRole::Supervisor) => true,
            (Scope::Review, UserRole::GateOperator) => false,
            (Scope::Administration, UserRole::Admin) => true,
            (Scope::Administration, UserRole::Supervisor | UserRole::GateOperator) => false,
        }
    }

    pub fn require(self, actor: &User) -> DomainResult<()> {
        if self.permits(actor.role) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(self.denial().to_string()))
        }
    }

    fn denial(self) -> &'static str {
        match self {
            Scope::Sync => "Access denied",
            Scope::Review => "Supervisor or admin access required",
            Scope::Administration => "Admin access required",
        }
    }
}

/// Admin may reset anyone; a Supervisor only the operators it manages.
pub fn authorize_password_reset(actor: &User, target_id: &str) -> DomainResult<()> {
    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::Supervisor if actor.user_id != target_id && actor.manages(target_id) => Ok(()),
        UserRole::Supervisor => Err(DomainError::Forbidden(
            "You can only reset passwords for operators you manage".to_string(),
        )),
        UserRole::GateOperator => Err(DomainError::Forbidden(
            Scope::Review.denial().to_string(),
        )),
    }
}

/// Admin only, and never the caller's own account.
pub fn authorize_user_deletion(actor: &User, target_id: &str) -> DomainResult<()> {
    Scope::Administration.require(actor)?;
    if actor.user_id == target_id {
        return Err(DomainError::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }
    Ok(())
}
