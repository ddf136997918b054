use std::{str::FromStr, sync::Arc};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::error::{UseCaseError, UseCaseResult},
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::{
            authorization::{Actor, Operation, authorize},
            enums::roles::Role,
            subscriptions::ReconcileOutcome,
        },
    },
};

/// The caller after reconciliation, plus what reconciliation saw and when.
#[derive(Debug, Clone)]
pub struct ResolvedActor {
    pub actor: Actor,
    pub reconciled: Option<ReconcileOutcome>,
    pub now: DateTime<Utc>,
}

/// Reconcile-then-authorize: every role-sensitive operation derives the
/// caller's effective role here instead of trusting the session claim.
pub struct RoleResolver<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
}

impl<S> RoleResolver<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>) -> Self {
        Self { subscription_repo }
    }

    pub async fn resolve(&self, user_id: Option<Uuid>) -> UseCaseResult<ResolvedActor> {
        let now = Utc::now();
        let Some(user_id) = user_id else {
            debug!("role_resolver: anonymous caller");
            return Ok(ResolvedActor {
                actor: Actor::anonymous(),
                reconciled: None,
                now,
            });
        };

        let outcome = self
            .subscription_repo
            .reconcile(user_id, now)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "role_resolver: reconcile failed");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, "role_resolver: session user no longer exists");
                UseCaseError::Unauthenticated
            })?;

        if !outcome.expired.is_empty() {
            info!(
                %user_id,
                expired_count = outcome.expired.len(),
                "role_resolver: expired lapsed subscriptions"
            );
        }

        let role = Role::from_str(&outcome.user.role).map_err(|err| {
            error!(%user_id, stored_role = %outcome.user.role, "role_resolver: unknown stored role");
            UseCaseError::Internal(anyhow!(err))
        })?;

        debug!(%user_id, %role, "role_resolver: effective role resolved");

        Ok(ResolvedActor {
            actor: Actor::authenticated(user_id, role),
            reconciled: Some(outcome),
            now,
        })
    }

    pub async fn resolve_and_authorize(
        &self,
        user_id: Option<Uuid>,
        operation: Operation,
        resource_owner_id: Option<Uuid>,
    ) -> UseCaseResult<ResolvedActor> {
        let resolved = self.resolve(user_id).await?;
        check(&resolved.actor, operation, resource_owner_id)?;
        Ok(resolved)
    }
}

/// Runs the guard and logs a rejection.
pub fn check(
    actor: &Actor,
    operation: Operation,
    resource_owner_id: Option<Uuid>,
) -> UseCaseResult<()> {
    authorize(actor, operation, resource_owner_id).map_err(|err| {
        warn!(
            user_id = ?actor.user_id,
            role = %actor.role,
            %operation,
            "authorization: request rejected"
        );
        UseCaseError::from(err)
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::subscriptions::MockSubscriptionRepository;
    use test_support::{outcome, reconciling_as};

    #[tokio::test]
    async fn anonymous_callers_skip_reconciliation() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_reconcile().never();

        let resolver = RoleResolver::new(Arc::new(subscription_repo));
        let resolved = resolver.resolve(None).await.unwrap();

        assert_eq!(resolved.actor, Actor::anonymous());
        assert!(resolved.reconciled.is_none());
    }

    #[tokio::test]
    async fn uses_reconciled_role_not_session_claim() {
        let user_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_reconcile()
            .withf(move |id, _| *id == user_id)
            .returning(move |id, _| {
                Ok(Some(ReconcileOutcome {
                    expired: vec![Uuid::new_v4()],
                    ..outcome(id, Role::User)
                }))
            });

        let resolver = RoleResolver::new(Arc::new(subscription_repo));
        let err = resolver
            .resolve_and_authorize(Some(user_id), Operation::CreateAdvertisement, None)
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn premium_passes_premium_gate() {
        let user_id = Uuid::new_v4();
        let resolver = RoleResolver::new(Arc::new(reconciling_as(user_id, Role::Premium)));

        let resolved = resolver
            .resolve_and_authorize(Some(user_id), Operation::CreateAdvertisement, None)
            .await
            .unwrap();

        assert_eq!(resolved.actor.role, Role::Premium);
    }

    #[tokio::test]
    async fn reports_the_instant_it_reconciled_at() {
        let user_id = Uuid::new_v4();
        let seen = Arc::new(std::sync::Mutex::new(None));
        let recorder = Arc::clone(&seen);
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_reconcile()
            .times(1)
            .returning(move |id, now| {
                *recorder.lock().unwrap() = Some(now);
                Ok(Some(outcome(id, Role::User)))
            });

        let resolver = RoleResolver::new(Arc::new(subscription_repo));
        let resolved = resolver.resolve(Some(user_id)).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), Some(resolved.now));
    }

    #[tokio::test]
    async fn missing_user_is_unauthenticated() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_reconcile()
            .returning(|_, _| Ok(None));

        let resolver = RoleResolver::new(Arc::new(subscription_repo));
        let err = resolver.resolve(Some(Uuid::new_v4())).await.unwrap_err();

        assert!(matches!(err, UseCaseError::Unauthenticated));
    }

    #[tokio::test]
    async fn storage_failure_is_internal() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_reconcile()
            .returning(|_, _| Err(anyhow!("connection refused")));

        let resolver = RoleResolver::new(Arc::new(subscription_repo));
        let err = resolver.resolve(Some(Uuid::new_v4())).await.unwrap_err();

        assert_eq!(err.status_code().as_u16(), 500);
    }
}
