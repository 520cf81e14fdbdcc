//! Supervisor/operator linkage maintenance
//!
//! Only `operator.supervisor_id` is stored; a supervisor's managed set is
//! derived from it on read. The functions here are the one place where that
//! edge is validated or repaired, and every user mutation goes through them.

use tracing::warn;

use crate::domain::{DomainError, DomainResult, RepositoryProvider, User, UserRole};

/// Checks a requested link before the user record is written.
pub async fn validate_link(
    repos: &dyn RepositoryProvider,
    role: UserRole,
    supervisor_id: Option<&str>,
) -> DomainResult<()> {
    let Some(supervisor_id) = supervisor_id else {
        return Ok(());
    };

    if role != UserRole::GateOperator {
        return Err(DomainError::Validation(
            "Only gate operators can be assigned a supervisor".to_string(),
        ));
    }

    match repos.users().find_by_id(supervisor_id).await? {
        Some(sup) if sup.role == UserRole::Supervisor => Ok(()),
        Some(_) => Err(DomainError::Validation(format!(
            "User '{}' is not a supervisor",
            supervisor_id
        ))),
        None => Err(DomainError::Validation(format!(
            "Supervisor '{}' does not exist",
            supervisor_id
        ))),
    }
}

/// Clears `supervisor_id` on every operator pointing at `supervisor_id`.
///
/// Best-effort: failures are logged and skipped. Returns how many operators
/// were detached.
pub async fn detach_operators(repos: &dyn RepositoryProvider, supervisor_id: &str) -> usize {
    let operators = match repos.users().list_operator_ids(supervisor_id).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!(supervisor_id, error = %e, "Failed to list managed operators");
            return 0;
        }
    };

    let mut detached = 0;
    for operator_id in operators {
        match repos.users().set_supervisor(&operator_id, None).await {
            Ok(()) => detached += 1,
            Err(e) => warn!(
                supervisor_id,
                operator_id = %operator_id,
                error = %e,
                "Failed to detach operator from supervisor"
            ),
        }
    }
    detached
}

/// Repairs links after `after` replaced `before`.
pub async fn after_update(repos: &dyn RepositoryProvider, before: &User, after: &User) {
    if before.role == UserRole::Supervisor && after.role != UserRole::Supervisor {
        detach_operators(repos, &after.user_id).await;
    }
}

/// Repairs links after `deleted` was removed.
pub async fn after_delete(repos: &dyn RepositoryProvider, deleted: &User) {
    if deleted.role == UserRole::Supervisor {
        detach_operators(repos, &deleted.user_id).await;
    }
}
