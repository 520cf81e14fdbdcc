//! SeaORM implementation of UserRepository

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{db_err, db_err_or_conflict};
use crate::domain::{DomainError, DomainResult, User, UserRepository, UserRole};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Supervisor => UserRole::Supervisor,
        user::UserRole::GateOperator => UserRole::GateOperator,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Supervisor => user::UserRole::Supervisor,
        UserRole::GateOperator => user::UserRole::GateOperator,
    }
}

fn user_model_to_domain(model: user::Model, managed: BTreeSet<String>) -> DomainResult<User> {
    let allowed_checkpoints: BTreeSet<String> = serde_json::from_str(&model.allowed_checkpoints)
        .map_err(|e| {
            DomainError::Internal(format!(
                "Corrupt allowed_checkpoints for user {}: {}",
                model.user_id, e
            ))
        })?;

    Ok(User {
        user_id: model.user_id,
        username: model.username,
        role: entity_role_to_domain(model.role),
        allowed_checkpoints,
        supervisor_id: model.supervisor_id,
        managed_operators: managed,
        last_login: model.last_login,
        created_at: model.created_at,
    })
}

fn user_to_active_model(user: &User) -> DomainResult<user::ActiveModel> {
    let allowed_checkpoints = serde_json::to_string(&user.allowed_checkpoints)
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    Ok(user::ActiveModel {
        user_id: Set(user.user_id.clone()),
        username: Set(user.username.clone()),
        role: Set(domain_role_to_entity(user.role)),
        allowed_checkpoints: Set(allowed_checkpoints),
        supervisor_id: Set(user.supervisor_id.clone()),
        last_login: Set(user.last_login),
        created_at: Set(user.created_at),
    })
}

impl SeaOrmUserRepository {
    async fn operator_ids(&self, supervisor_id: &str) -> DomainResult<BTreeSet<String>> {
        let ids: Vec<String> = user::Entity::find()
            .select_only()
            .column(user::Column::UserId)
            .filter(user::Column::SupervisorId.eq(supervisor_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(ids.into_iter().collect())
    }

    async fn hydrate(&self, model: Option<user::Model>) -> DomainResult<Option<User>> {
        match model {
            Some(model) => {
                let managed = self.operator_ids(&model.user_id).await?;
                user_model_to_domain(model, managed).map(Some)
            }
            None => Ok(None),
        }
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn insert(&self, user: User) -> DomainResult<()> {
        let taken = user::Entity::find()
            .filter(
                user::Column::Username
                    .eq(user.username.as_str())
                    .or(user::Column::UserId.eq(user.user_id.as_str())),
            )
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if taken > 0 {
            return Err(DomainError::Conflict("Username already exists".to_string()));
        }

        user_to_active_model(&user)?
            .insert(&self.db)
            .await
            .map_err(|e| db_err_or_conflict(e, "Username already exists"))?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        self.hydrate(model).await
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        self.hydrate(model).await
    }

    async fn list(&self) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut managed: HashMap<String, BTreeSet<String>> = HashMap::new();
        for model in &models {
            if let Some(sup) = &model.supervisor_id {
                managed
                    .entry(sup.clone())
                    .or_default()
                    .insert(model.user_id.clone());
            }
        }

        models
            .into_iter()
            .map(|m| {
                let ops = managed.remove(&m.user_id).unwrap_or_default();
                user_model_to_domain(m, ops)
            })
            .collect()
    }

    async fn count(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn list_operator_ids(&self, supervisor_id: &str) -> DomainResult<Vec<String>> {
        Ok(self.operator_ids(supervisor_id).await?.into_iter().collect())
    }

    async fn update(&self, user: &User) -> DomainResult<()> {
        let exists = user::Entity::find_by_id(user.user_id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if exists.is_none() {
            return Err(DomainError::not_found("User", "user_id", &user.user_id));
        }

        user_to_active_model(user)?
            .update(&self.db)
            .await
            .map_err(|e| db_err_or_conflict(e, "Username already exists"))?;
        Ok(())
    }

    async fn set_supervisor(
        &self,
        operator_id: &str,
        supervisor_id: Option<&str>,
    ) -> DomainResult<()> {
        let result = user::Entity::update_many()
            .col_expr(
                user::Column::SupervisorId,
                Expr::value(supervisor_id.map(str::to_string)),
            )
            .filter(user::Column::UserId.eq(operator_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("User", "user_id", operator_id));
        }
        Ok(())
    }

    async fn touch_last_login(&self, user_id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::LastLogin, Expr::value(Some(at)))
            .filter(user::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("User", "user_id", user_id));
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(user_id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("User", "user_id", user_id));
        }
        Ok(())
    }
}
