//! Demo directory data for local development
//!
//! Idempotent: records that already exist are left alone.

use tracing::{debug, info};

use crate::domain::{Checkpoint, DomainResult, RepositoryProvider, User, UserRole};
use crate::infrastructure::crypto::PasswordHasher;

/// Password of every seeded account
pub const DEMO_PASSWORD: &str = "password123";

const CHECKPOINTS: [(&str, &str, &str); 4] = [
    ("CP-EAST-MAIN", "East Main Gate", "Sector 1"),
    ("CP-WEST-GATE", "West Gate", "Sector 4"),
    ("CP-NORTH-01", "North Checkpoint 1", "Sector 2"),
    ("CP-SOUTH-01", "South Checkpoint 1", "Sector 3"),
];

fn demo_users() -> Vec<User> {
    vec![
        User::new("user-supervisor-john", "supervisor_john", UserRole::Supervisor)
            .with_checkpoints(["CP-EAST-MAIN", "CP-NORTH-01"]),
        // Supervisor must exist before its operator
        User::new("user-op-east", "op_east", UserRole::GateOperator)
            .with_checkpoints(["CP-EAST-MAIN"])
            .with_supervisor("user-supervisor-john"),
        User::new("user-op-west", "op_west", UserRole::GateOperator)
            .with_checkpoints(["CP-WEST-GATE"]),
    ]
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub checkpoints: usize,
    pub users: usize,
}

pub async fn seed_demo_data(
    repos: &dyn RepositoryProvider,
    hasher: &PasswordHasher,
) -> DomainResult<SeedReport> {
    let mut report = SeedReport::default();

    for (id, name, location) in CHECKPOINTS {
        if repos.checkpoints().find_by_id(id).await?.is_some() {
            debug!(checkpoint_id = id, "Seed checkpoint already present");
            continue;
        }
        repos
            .checkpoints()
            .insert(Checkpoint::new(id, name, location))
            .await?;
        report.checkpoints += 1;
    }

    let password_hash = hasher.hash(DEMO_PASSWORD)?;
    for user in demo_users() {
        if repos.users().find_by_username(&user.username).await?.is_some() {
            debug!(username = %user.username, "Seed user already present");
            continue;
        }
        let user_id = user.user_id.clone();
        repos.users().insert(user).await?;
        repos.credentials().store(&user_id, &password_hash).await?;
        report.users += 1;
    }

    info!(
        checkpoints = report.checkpoints,
        users = report.users,
        "🌱 Demo data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryStore;

    #[tokio::test]
    async fn seeding_is_idempotent_and_links_team() {
        let store = InMemoryStore::new();
        let hasher = PasswordHasher::new(4);

        let first = seed_demo_data(&store, &hasher).await.unwrap();
        assert_eq!(first, SeedReport { checkpoints: 4, users: 3 });
        let second = seed_demo_data(&store, &hasher).await.unwrap();
        assert_eq!(second, SeedReport::default());

        let john = store
            .users()
            .find_by_id("user-supervisor-john")
            .await
            .unwrap()
            .unwrap();
        assert!(john.manages("user-op-east"));
        assert!(!john.manages("user-op-west"));
    }
}
