//! User management service: application-layer orchestration
//!
//! Authentication, token refresh and every user-administration use case.
//! HTTP handlers stay thin wrappers that delegate here.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::access::{
    authorize_password_reset, authorize_user_deletion, supervision, Scope,
};
use crate::domain::{DomainError, DomainResult, RepositoryProvider, User, UserRole};
use crate::infrastructure::crypto::{
    validate_password_strength, PasswordHasher, TokenKind, TokenService,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Tokens returned after a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// A fresh access token minted from a refresh token
#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub allowed_checkpoints: BTreeSet<String>,
    pub supervisor_id: Option<String>,
}

/// Partial update. `None` leaves a field unchanged; an empty
/// `supervisor_id` removes the link.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub role: Option<UserRole>,
    pub allowed_checkpoints: Option<BTreeSet<String>>,
    pub supervisor_id: Option<String>,
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    /// Compared against when the account or its credential is missing
    decoy_digest: String,
}

impl UserService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            decoy_digest: hasher.decoy_digest(),
            repos,
            hasher,
            tokens,
        }
    }

    // ── Authentication ──────────────────────────────────────────

    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// Every failure answers the same message.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<LoginResult> {
        let Some(mut user) = self.check_credentials(username, password).await? else {
            metrics::counter!("auth_logins_total", "outcome" => "failure").increment(1);
            warn!(target: "audit", username, "Login failed");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        let now = Utc::now();
        match self.repos.users().touch_last_login(&user.user_id, now).await {
            Ok(()) => user.last_login = Some(now),
            Err(e) => warn!(user_id = %user.user_id, error = %e, "Failed to update last login"),
        }

        let access_token = self.tokens.issue_access_token(&user)?;
        let refresh_token = self.tokens.issue_refresh_token(&user)?;

        metrics::counter!("auth_logins_total", "outcome" => "success").increment(1);
        info!(
            target: "audit",
            user_id = %user.user_id,
            username = %user.username,
            role = %user.role,
            "Login succeeded"
        );

        Ok(LoginResult {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl_secs(),
            user,
        })
    }

    async fn check_credentials(&self, username: &str, password: &str) -> DomainResult<Option<User>> {
        let Some(user) = self.repos.users().find_by_username(username).await? else {
            self.hasher.verify(password, &self.decoy_digest);
            return Ok(None);
        };
        let Some(credential) = self.repos.credentials().find(&user.user_id).await? else {
            self.hasher.verify(password, &self.decoy_digest);
            return Ok(None);
        };
        if !self.hasher.verify(password, &credential.password_hash) {
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Mint a new access token from a refresh token.
    ///
    /// Claims are not trusted: the live user record is re-read so role and
    /// allowlist changes take effect.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<AccessGrant> {
        let claims = self.tokens.validate(refresh_token, TokenKind::Refresh)?;
        let user = self
            .repos
            .users()
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("User not found".into()))?;

        Ok(AccessGrant {
            access_token: self.tokens.issue_access_token(&user)?,
            token_type: "Bearer",
            expires_in: self.tokens.access_ttl_secs(),
        })
    }

    /// Resolve a bearer access token to the live user record.
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<User> {
        let claims = self.tokens.validate(access_token, TokenKind::Access)?;
        self.repos
            .users()
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("User not found".into()))
    }

    // ── Administration ──────────────────────────────────────────

    pub async fn list_users(&self, actor: &User) -> DomainResult<Vec<User>> {
        Scope::Administration.require(actor)?;
        self.repos.users().list().await
    }

    pub async fn create_user(&self, actor: &User, new: NewUser) -> DomainResult<User> {
        Scope::Administration.require(actor)?;

        let username = new.username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::Validation("Username is required".into()));
        }
        validate_password_strength(&new.password)?;

        if self.repos.users().find_by_username(&username).await?.is_some() {
            return Err(DomainError::Conflict("Username already exists".into()));
        }

        let supervisor_id = new.supervisor_id.filter(|id| !id.trim().is_empty());
        supervision::validate_link(self.repos.as_ref(), new.role, supervisor_id.as_deref()).await?;

        let password_hash = self.hasher.hash(&new.password)?;

        let mut user = User::new(uuid::Uuid::new_v4().to_string(), username, new.role)
            .with_checkpoints(new.allowed_checkpoints);
        user.supervisor_id = supervisor_id;

        self.repos.users().insert(user.clone()).await?;
        if let Err(e) = self
            .repos
            .credentials()
            .store(&user.user_id, &password_hash)
            .await
        {
            // Without a credential the account is unusable
            if let Err(undo) = self.repos.users().delete(&user.user_id).await {
                warn!(user_id = %user.user_id, error = %undo, "Failed to roll back user creation");
            }
            return Err(e);
        }

        info!(
            target: "audit",
            actor_id = %actor.user_id,
            user_id = %user.user_id,
            username = %user.username,
            role = %user.role,
            "User created"
        );
        Ok(user)
    }

    pub async fn update_user(
        &self,
        actor: &User,
        user_id: &str,
        changes: UserChanges,
    ) -> DomainResult<User> {
        Scope::Administration.require(actor)?;

        let before = self
            .repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "user_id", user_id))?;

        let mut after = before.clone();
        if let Some(role) = changes.role {
            if actor.user_id == user_id && role != before.role {
                return Err(DomainError::Validation(
                    "Cannot change your own role".into(),
                ));
            }
            after.role = role;
        }
        if let Some(checkpoints) = changes.allowed_checkpoints {
            after.allowed_checkpoints = checkpoints;
        }
        match changes.supervisor_id {
            Some(id) if id.trim().is_empty() => after.supervisor_id = None,
            Some(id) => after.supervisor_id = Some(id),
            // An unrequested link does not survive a role change
            None if after.role != UserRole::GateOperator => after.supervisor_id = None,
            None => {}
        }

        supervision::validate_link(self.repos.as_ref(), after.role, after.supervisor_id.as_deref())
            .await?;

        self.repos.users().update(&after).await?;
        supervision::after_update(self.repos.as_ref(), &before, &after).await;

        info!(
            target: "audit",
            actor_id = %actor.user_id,
            user_id = %after.user_id,
            role = %after.role,
            supervisor_id = ?after.supervisor_id,
            "User updated"
        );

        self.repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "user_id", user_id))
    }

    pub async fn delete_user(&self, actor: &User, user_id: &str) -> DomainResult<()> {
        authorize_user_deletion(actor, user_id)?;

        let target = self
            .repos
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "user_id", user_id))?;

        self.repos.users().delete(user_id).await?;
        if let Err(e) = self.repos.credentials().delete(user_id).await {
            warn!(user_id, error = %e, "Failed to remove credential of deleted user");
        }
        supervision::after_delete(self.repos.as_ref(), &target).await;

        info!(
            target: "audit",
            actor_id = %actor.user_id,
            user_id,
            username = %target.username,
            "User deleted"
        );
        Ok(())
    }

    /// Replace a user's password.
    ///
    /// The new password is checked before anything is looked up or written.
    pub async fn reset_password(
        &self,
        actor: &User,
        target_id: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        validate_password_strength(new_password)?;
        authorize_password_reset(actor, target_id)?;

        let target = self
            .repos
            .users()
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "user_id", target_id))?;

        let password_hash = self.hasher.hash(new_password)?;
        self.repos
            .credentials()
            .store(&target.user_id, &password_hash)
            .await?;

        info!(
            target: "audit",
            actor_id = %actor.user_id,
            user_id = %target.user_id,
            username = %target.username,
            "Password reset"
        );
        Ok(())
    }

    /// Create the first Admin when the directory is empty.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> DomainResult<bool> {
        if self.repos.users().count().await? > 0 {
            return Ok(false);
        }

        let password_hash = self.hasher.hash(password)?;
        let admin = User::new(uuid::Uuid::new_v4().to_string(), username, UserRole::Admin);
        self.repos.users().insert(admin.clone()).await?;
        self.repos
            .credentials()
            .store(&admin.user_id, &password_hash)
            .await?;

        info!(target: "audit", user_id = %admin.user_id, username, "Bootstrap admin created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::JwtConfig;
    use crate::infrastructure::InMemoryStore;

    struct Fixture {
        store: Arc<InMemoryStore>,
        service: UserService,
        admin: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let service = UserService::new(
            store.clone(),
            PasswordHasher::new(4),
            Arc::new(TokenService::new(JwtConfig::default())),
        );
        service.ensure_bootstrap_admin("admin", "admin12345").await.unwrap();
        let admin = store.users().find_by_username("admin").await.unwrap().unwrap();
        Fixture {
            store,
            service,
            admin,
        }
    }

    fn new_user(username: &str, role: UserRole) -> NewUser {
        NewUser {
            username: username.into(),
            password: "password123".into(),
            role,
            allowed_checkpoints: BTreeSet::new(),
            supervisor_id: None,
        }
    }

    #[tokio::test]
    async fn bootstrap_admin_only_once() {
        let f = fixture().await;
        assert!(!f.service.ensure_bootstrap_admin("other", "admin12345").await.unwrap());
        assert_eq!(f.store.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_issues_tokens_and_records_last_login() {
        let f = fixture().await;
        let result = f.service.login("admin", "admin12345").await.unwrap();

        assert_eq!(result.token_type, "Bearer");
        assert!(result.user.last_login.is_some());
        let user = f.service.authenticate(&result.access_token).await.unwrap();
        assert_eq!(user.user_id, f.admin.user_id);
        assert!(f.service.authenticate(&result.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let f = fixture().await;
        let wrong_password = f.service.login("admin", "nope12345").await.unwrap_err();
        let unknown_user = f.service.login("ghost", "admin12345").await.unwrap_err();

        assert_eq!(wrong_password, unknown_user);
        assert_eq!(
            wrong_password,
            DomainError::Unauthorized(INVALID_CREDENTIALS.into())
        );
    }

    #[tokio::test]
    async fn accounts_without_credentials_still_pay_for_a_comparison() {
        let f = fixture().await;
        f.store
            .users()
            .insert(User::new("bare", "bare", UserRole::GateOperator))
            .await
            .unwrap();

        assert!(f.service.decoy_digest.starts_with("$2b$04$"));
        assert!(!f.service.hasher.verify("admin12345", &f.service.decoy_digest));

        let err = f.service.login("bare", "password123").await.unwrap_err();
        assert_eq!(err, DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    #[tokio::test]
    async fn refresh_reads_live_user() {
        let f = fixture().await;
        let op = f
            .service
            .create_user(&f.admin, new_user("op_east", UserRole::GateOperator))
            .await
            .unwrap();
        let tokens = f.service.login("op_east", "password123").await.unwrap();

        f.service
            .update_user(
                &f.admin,
                &op.user_id,
                UserChanges {
                    role: Some(UserRole::Supervisor),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();

        let grant = f.service.refresh(&tokens.refresh_token).await.unwrap();
        let user = f.service.authenticate(&grant.access_token).await.unwrap();
        assert_eq!(user.role, UserRole::Supervisor);

        f.service.delete_user(&f.admin, &op.user_id).await.unwrap();
        assert!(matches!(
            f.service.refresh(&tokens.refresh_token).await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn access_token_is_refused_for_refresh() {
        let f = fixture().await;
        let tokens = f.service.login("admin", "admin12345").await.unwrap();
        assert!(matches!(
            f.service.refresh(&tokens.access_token).await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn create_user_rejects_weak_password_and_duplicates() {
        let f = fixture().await;
        let mut weak = new_user("weak", UserRole::GateOperator);
        weak.password = "abc".into();
        assert!(matches!(
            f.service.create_user(&f.admin, weak).await,
            Err(DomainError::Validation(_))
        ));

        let dup = new_user("admin", UserRole::GateOperator);
        assert!(matches!(
            f.service.create_user(&f.admin, dup).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn only_admins_manage_users() {
        let f = fixture().await;
        let sup = f
            .service
            .create_user(&f.admin, new_user("sup", UserRole::Supervisor))
            .await
            .unwrap();

        assert!(matches!(
            f.service.create_user(&sup, new_user("x", UserRole::Admin)).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.list_users(&sup).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn supervisor_link_is_maintained_across_mutations() {
        let f = fixture().await;
        let sup = f
            .service
            .create_user(&f.admin, new_user("supervisor_john", UserRole::Supervisor))
            .await
            .unwrap();
        let mut op_req = new_user("op_east", UserRole::GateOperator);
        op_req.supervisor_id = Some(sup.user_id.clone());
        let op = f.service.create_user(&f.admin, op_req).await.unwrap();

        let sup_view = f.store.users().find_by_id(&sup.user_id).await.unwrap().unwrap();
        assert!(sup_view.manages(&op.user_id));

        // Unlink with an empty id
        f.service
            .update_user(
                &f.admin,
                &op.user_id,
                UserChanges {
                    supervisor_id: Some(String::new()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();
        let sup_view = f.store.users().find_by_id(&sup.user_id).await.unwrap().unwrap();
        assert!(sup_view.managed_operators.is_empty());

        // Relink, then delete the supervisor
        f.service
            .update_user(
                &f.admin,
                &op.user_id,
                UserChanges {
                    supervisor_id: Some(sup.user_id.clone()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();
        f.service.delete_user(&f.admin, &sup.user_id).await.unwrap();

        let op_view = f.store.users().find_by_id(&op.user_id).await.unwrap().unwrap();
        assert_eq!(op_view.supervisor_id, None);
    }

    #[tokio::test]
    async fn role_change_away_from_operator_drops_link() {
        let f = fixture().await;
        let sup = f
            .service
            .create_user(&f.admin, new_user("sup", UserRole::Supervisor))
            .await
            .unwrap();
        let mut op_req = new_user("op", UserRole::GateOperator);
        op_req.supervisor_id = Some(sup.user_id.clone());
        let op = f.service.create_user(&f.admin, op_req).await.unwrap();

        let promoted = f
            .service
            .update_user(
                &f.admin,
                &op.user_id,
                UserChanges {
                    role: Some(UserRole::Supervisor),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(promoted.supervisor_id, None);
    }

    #[tokio::test]
    async fn self_deletion_is_refused() {
        let f = fixture().await;
        assert!(matches!(
            f.service.delete_user(&f.admin, &f.admin.user_id).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn weak_reset_fails_before_any_mutation() {
        let f = fixture().await;
        let before = f.store.credentials().find(&f.admin.user_id).await.unwrap().unwrap();

        assert!(matches!(
            f.service.reset_password(&f.admin, &f.admin.user_id, "abc").await,
            Err(DomainError::Validation(_))
        ));
        let after = f.store.credentials().find(&f.admin.user_id).await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn supervisor_resets_only_managed_operators() {
        let f = fixture().await;
        let sup = f
            .service
            .create_user(&f.admin, new_user("sup", UserRole::Supervisor))
            .await
            .unwrap();
        let mut east_req = new_user("op_east", UserRole::GateOperator);
        east_req.supervisor_id = Some(sup.user_id.clone());
        let east = f.service.create_user(&f.admin, east_req).await.unwrap();
        let west = f
            .service
            .create_user(&f.admin, new_user("op_west", UserRole::GateOperator))
            .await
            .unwrap();

        let sup = f.store.users().find_by_id(&sup.user_id).await.unwrap().unwrap();
        f.service
            .reset_password(&sup, &east.user_id, "newpass456")
            .await
            .unwrap();
        assert!(f.service.login("op_east", "newpass456").await.is_ok());

        assert!(matches!(
            f.service.reset_password(&sup, &west.user_id, "newpass456").await,
            Err(DomainError::Forbidden(_))
        ));
    }
}
