use std::{str::FromStr, sync::Arc};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{
    Connection, PgConnection,
    dsl::{exists, select},
    insert_into,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    update,
};
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
            users::UserEntity,
        },
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            enums::roles::Role,
            subscriptions::{
                ReconcileOutcome, SubscribeOutcome, plan_reconciliation, role_after_subscribe,
            },
        },
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{subscriptions, users},
    },
};

const ONE_ACTIVE_PER_USER: &str = "subscriptions_one_active_per_user";

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Row lock on the user; every subscription mutation for that user queues
/// behind it until the surrounding transaction ends.
fn lock_user(tx: &mut PgConnection, user_id: Uuid) -> QueryResult<Option<UserEntity>> {
    users::table
        .find(user_id)
        .select(UserEntity::as_select())
        .for_update()
        .first::<UserEntity>(tx)
        .optional()
}

fn stored_role(user: &UserEntity) -> Result<Role> {
    Role::from_str(&user.role).map_err(|err| anyhow!(err))
}

fn is_one_active_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info))
            if info.constraint_name() == Some(ONE_ACTIVE_PER_USER)
    )
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn subscribe(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscribeOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let user_id = insert_subscription_entity.user_id;

        let result = conn.transaction::<SubscribeOutcome, anyhow::Error, _>(|tx| {
            let user = lock_user(tx, user_id)?
                .ok_or_else(|| anyhow!("user {} not found", user_id))?;

            let has_active = select(exists(
                subscriptions::table
                    .filter(subscriptions::user_id.eq(user_id))
                    .filter(subscriptions::is_active.eq(true)),
            ))
            .get_result::<bool>(tx)?;
            if has_active {
                return Ok(SubscribeOutcome::AlreadyActive);
            }

            let subscription = insert_into(subscriptions::table)
                .values(&insert_subscription_entity)
                .returning(SubscriptionEntity::as_returning())
                .get_result::<SubscriptionEntity>(tx)?;

            let current_role = stored_role(&user)?;
            let role = role_after_subscribe(current_role);
            if role != current_role {
                update(users::table.find(user_id))
                    .set(users::role.eq(role.to_string()))
                    .execute(tx)?;
            }

            Ok(SubscribeOutcome::Subscribed { subscription, role })
        });

        match result {
            Err(err) if is_one_active_violation(&err) => Ok(SubscribeOutcome::AlreadyActive),
            other => other,
        }
    }

    async fn reconcile(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ReconcileOutcome>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<Option<ReconcileOutcome>, anyhow::Error, _>(|tx| {
            let Some(mut user) = lock_user(tx, user_id)? else {
                return Ok(None);
            };

            let active = subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .filter(subscriptions::is_active.eq(true))
                .select(SubscriptionEntity::as_select())
                .load::<SubscriptionEntity>(tx)?;

            let plan = plan_reconciliation(stored_role(&user)?, &active, now);

            if !plan.expire_ids.is_empty() {
                update(
                    subscriptions::table
                        .filter(subscriptions::id.eq_any(plan.expire_ids.clone())),
                )
                .set(subscriptions::is_active.eq(false))
                .execute(tx)?;
            }

            if plan.role_changed {
                update(users::table.find(user_id))
                    .set(users::role.eq(plan.role.to_string()))
                    .execute(tx)?;
                user.role = plan.role.to_string();
            }

            Ok(Some(ReconcileOutcome {
                user,
                active_subscription: plan.active_subscription,
                expired: plan.expire_ids,
            }))
        })
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .select(SubscriptionEntity::as_select())
            .order(subscriptions::created_at.desc())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }
}
