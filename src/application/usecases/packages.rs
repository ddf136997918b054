use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::{
        error::{UseCaseError, UseCaseResult},
        role_resolver::RoleResolver,
    },
    domain::{
        entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
        repositories::{packages::PackageRepository, subscriptions::SubscriptionRepository},
        value_objects::{
            authorization::Operation,
            packages::{CreatePackageModel, PackageModel},
            subscriptions::{
                CheckSubscriptionModel, SubscribeModel, SubscribeOutcome, SubscriptionModel,
                subscription_end, subscription_state,
            },
        },
    },
};

pub struct PackageUseCase<P, S>
where
    P: PackageRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    package_repo: Arc<P>,
    subscription_repo: Arc<S>,
    role_resolver: RoleResolver<S>,
}

impl<P, S> PackageUseCase<P, S>
where
    P: PackageRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(package_repo: Arc<P>, subscription_repo: Arc<S>) -> Self {
        Self {
            package_repo,
            role_resolver: RoleResolver::new(Arc::clone(&subscription_repo)),
            subscription_repo,
        }
    }

    pub async fn list_packages(&self) -> UseCaseResult<Vec<PackageModel>> {
        let packages = self.package_repo.list().await.map_err(|err| {
            error!(db_error = ?err, "packages: failed to list packages");
            UseCaseError::Internal(err)
        })?;
        info!(package_count = packages.len(), "packages: packages loaded");
        Ok(packages.into_iter().map(PackageModel::from).collect())
    }

    pub async fn create_package(
        &self,
        user_id: Uuid,
        create_package_model: CreatePackageModel,
    ) -> UseCaseResult<PackageModel> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::CreatePackage, None)
            .await?;

        let entity = create_package_model.to_entity().map_err(|reason| {
            warn!(%user_id, %reason, "packages: package rejected");
            UseCaseError::Validation(reason)
        })?;

        let package = self.package_repo.create(entity).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "packages: failed to create package");
            UseCaseError::Internal(err)
        })?;

        info!(%user_id, package_id = %package.id, "packages: package created");
        Ok(PackageModel::from(package))
    }

    /// Reconciles first so a lapsed subscription does not block a new one.
    pub async fn subscribe(
        &self,
        user_id: Uuid,
        subscribe_model: SubscribeModel,
    ) -> UseCaseResult<SubscriptionModel> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::Subscribe, None)
            .await?;

        let package_id = subscribe_model.package_id;
        let package = self
            .package_repo
            .find_by_id(package_id)
            .await
            .map_err(|err| {
                error!(%user_id, %package_id, db_error = ?err, "subscriptions: failed to load package");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%user_id, %package_id, "subscriptions: unknown package");
                UseCaseError::NotFound("package not found".to_string())
            })?;

        let start_date = Utc::now();
        let end_date = subscription_end(start_date, package.duration_days).ok_or_else(|| {
            warn!(
                %user_id,
                %package_id,
                duration_days = package.duration_days,
                "subscriptions: package duration out of range"
            );
            UseCaseError::Validation("package duration is out of range".to_string())
        })?;
        let insert_subscription_entity = InsertSubscriptionEntity {
            user_id,
            package_id,
            start_date,
            end_date,
            is_active: true,
        };

        let outcome = self
            .subscription_repo
            .subscribe(insert_subscription_entity)
            .await
            .map_err(|err| {
                error!(%user_id, %package_id, db_error = ?err, "subscriptions: subscribe failed");
                UseCaseError::Internal(err)
            })?;

        match outcome {
            SubscribeOutcome::Subscribed { subscription, role } => {
                info!(
                    %user_id,
                    %package_id,
                    subscription_id = %subscription.id,
                    end_date = %subscription.end_date,
                    %role,
                    "subscriptions: subscription activated"
                );
                Ok(SubscriptionModel::from(subscription))
            }
            SubscribeOutcome::AlreadyActive => {
                warn!(%user_id, %package_id, "subscriptions: already has an active subscription");
                Err(UseCaseError::AlreadySubscribed)
            }
        }
    }

    pub async fn my_subscriptions(&self, user_id: Uuid) -> UseCaseResult<Vec<SubscriptionModel>> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::ListMySubscriptions, None)
            .await?;

        let subscriptions = self.load_history(user_id).await?;
        Ok(subscriptions
            .into_iter()
            .map(SubscriptionModel::from)
            .collect())
    }

    pub async fn check_subscription(&self, user_id: Uuid) -> UseCaseResult<CheckSubscriptionModel> {
        let resolved = self
            .role_resolver
            .resolve_and_authorize(Some(user_id), Operation::CheckSubscription, None)
            .await?;
        let active_subscription = resolved
            .reconciled
            .and_then(|outcome| outcome.active_subscription);

        let history = self.load_history(user_id).await?;
        let state = subscription_state(&history, resolved.now);

        info!(
            %user_id,
            has_active_subscription = active_subscription.is_some(),
            ?state,
            "subscriptions: subscription checked"
        );

        Ok(CheckSubscriptionModel {
            has_active_subscription: active_subscription.is_some(),
            subscription: active_subscription.map(SubscriptionModel::from),
            state,
            role: resolved.actor.role,
        })
    }

    async fn load_history(
        &self,
        user_id: Uuid,
    ) -> UseCaseResult<Vec<SubscriptionEntity>> {
        self.subscription_repo
            .list_by_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to list subscriptions");
                UseCaseError::Internal(err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::usecases::role_resolver::test_support::{outcome, outcome_with},
        domain::{
            entities::packages::PackageEntity,
            repositories::{
                packages::MockPackageRepository, subscriptions::MockSubscriptionRepository,
            },
            value_objects::{
                enums::roles::Role,
                subscriptions::{ReconcileOutcome, SubscriptionState, role_after_subscribe},
            },
        },
    };
    use chrono::Duration;
    use mockall::predicate::eq;
    use std::sync::Mutex;

    fn package(id: Uuid, duration_days: i32) -> PackageEntity {
        PackageEntity {
            id,
            name: "Monthly".to_string(),
            description: String::new(),
            price_minor: 9900,
            duration_days,
            created_at: Utc::now(),
        }
    }

    fn stored(entity: &InsertSubscriptionEntity) -> SubscriptionEntity {
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id: entity.user_id,
            package_id: entity.package_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
            is_active: entity.is_active,
            created_at: entity.start_date,
        }
    }

    fn packages_with(package_id: Uuid) -> MockPackageRepository {
        let mut package_repo = MockPackageRepository::new();
        package_repo
            .expect_find_by_id()
            .with(eq(package_id))
            .returning(move |id| Ok(Some(package(id, 30))));
        package_repo
    }

    /// In-memory stand-in for the per-user lock: the second subscribe sees
    /// the first one's active row.
    fn subscriptions_for(user_id: Uuid, role: Role) -> MockSubscriptionRepository {
        let active: Arc<Mutex<Option<SubscriptionEntity>>> = Arc::new(Mutex::new(None));
        let mut subscription_repo = MockSubscriptionRepository::new();

        let reconcile_state = Arc::clone(&active);
        subscription_repo
            .expect_reconcile()
            .withf(move |id, _| *id == user_id)
            .returning(move |id, _| {
                let current = reconcile_state.lock().unwrap().clone();
                let role = if current.is_some() {
                    role_after_subscribe(role)
                } else {
                    role
                };
                Ok(Some(outcome_with(id, role, current)))
            });

        let subscribe_state = Arc::clone(&active);
        subscription_repo
            .expect_subscribe()
            .returning(move |entity| {
                let mut slot = subscribe_state.lock().unwrap();
                if slot.is_some() {
                    return Ok(SubscribeOutcome::AlreadyActive);
                }
                let subscription = stored(&entity);
                *slot = Some(subscription.clone());
                Ok(SubscribeOutcome::Subscribed {
                    subscription,
                    role: role_after_subscribe(role),
                })
            });
        subscription_repo
    }

    #[tokio::test]
    async fn subscribe_sets_end_from_package_duration() {
        let user_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();

        let usecase = PackageUseCase::new(
            Arc::new(packages_with(package_id)),
            Arc::new(subscriptions_for(user_id, Role::User)),
        );

        let subscription = usecase
            .subscribe(user_id, SubscribeModel { package_id })
            .await
            .unwrap();

        assert!(subscription.is_active);
        assert_eq!(subscription.package_id, package_id);
        assert_eq!(
            subscription.end_date - subscription.start_date,
            Duration::days(30)
        );
    }

    #[tokio::test]
    async fn second_subscribe_is_already_subscribed() {
        let user_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();

        let usecase = PackageUseCase::new(
            Arc::new(packages_with(package_id)),
            Arc::new(subscriptions_for(user_id, Role::User)),
        );

        usecase
            .subscribe(user_id, SubscribeModel { package_id })
            .await
            .unwrap();
        let err = usecase
            .subscribe(user_id, SubscribeModel { package_id })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::AlreadySubscribed));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn subscribe_to_unknown_package_is_not_found() {
        let user_id = Uuid::new_v4();
        let mut package_repo = MockPackageRepository::new();
        package_repo.expect_find_by_id().returning(|_| Ok(None));
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_reconcile()
            .returning(|id, _| Ok(Some(outcome(id, Role::User))));
        subscription_repo.expect_subscribe().never();

        let usecase = PackageUseCase::new(Arc::new(package_repo), Arc::new(subscription_repo));
        let err = usecase
            .subscribe(
                user_id,
                SubscribeModel {
                    package_id: Uuid::new_v4(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn out_of_range_duration_is_rejected_before_storage() {
        let user_id = Uuid::new_v4();
        let mut package_repo = MockPackageRepository::new();
        package_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(package(id, i32::MAX))));
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_reconcile()
            .returning(|id, _| Ok(Some(outcome(id, Role::User))));
        subscription_repo.expect_subscribe().never();

        let usecase = PackageUseCase::new(Arc::new(package_repo), Arc::new(subscription_repo));
        let err = usecase
            .subscribe(
                user_id,
                SubscribeModel {
                    package_id: Uuid::new_v4(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn admin_stays_admin_after_subscribing() {
        let user_id = Uuid::new_v4();
        let package_id = Uuid::new_v4();

        let usecase = PackageUseCase::new(
            Arc::new(packages_with(package_id)),
            Arc::new(subscriptions_for(user_id, Role::Admin)),
        );

        usecase
            .subscribe(user_id, SubscribeModel { package_id })
            .await
            .unwrap();
        let resolved = usecase.role_resolver.resolve(Some(user_id)).await.unwrap();

        assert_eq!(resolved.actor.role, Role::Admin);
    }

    #[tokio::test]
    async fn check_reports_reconciled_state() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let lapsed = SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            package_id: Uuid::new_v4(),
            start_date: now - Duration::days(31),
            end_date: now - Duration::days(1),
            is_active: false,
            created_at: now - Duration::days(31),
        };

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_reconcile()
            .times(1)
            .returning(|id, _| {
                Ok(Some(ReconcileOutcome {
                    expired: vec![Uuid::new_v4()],
                    ..outcome(id, Role::User)
                }))
            });
        subscription_repo
            .expect_list_by_user()
            .with(eq(user_id))
            .returning(move |_| Ok(vec![lapsed.clone()]));

        let usecase =
            PackageUseCase::new(Arc::new(MockPackageRepository::new()), Arc::new(subscription_repo));
        let check = usecase.check_subscription(user_id).await.unwrap();

        assert!(!check.has_active_subscription);
        assert!(check.subscription.is_none());
        assert_eq!(check.state, SubscriptionState::Expired);
        assert_eq!(check.role, Role::User);
    }

    /// A subscription ending a nanosecond after the reconcile instant is
    /// current for both the reconcile and the reported state.
    #[tokio::test]
    async fn check_judges_state_at_the_reconcile_instant() {
        let user_id = Uuid::new_v4();
        let seen: Arc<Mutex<Option<SubscriptionEntity>>> = Arc::new(Mutex::new(None));

        let mut subscription_repo = MockSubscriptionRepository::new();
        let recorder = Arc::clone(&seen);
        subscription_repo
            .expect_reconcile()
            .times(1)
            .returning(move |id, now| {
                let current = SubscriptionEntity {
                    id: Uuid::new_v4(),
                    user_id: id,
                    package_id: Uuid::new_v4(),
                    start_date: now - Duration::days(30),
                    end_date: now + Duration::nanoseconds(1),
                    is_active: true,
                    created_at: now - Duration::days(30),
                };
                *recorder.lock().unwrap() = Some(current.clone());
                Ok(Some(outcome_with(id, Role::Premium, Some(current))))
            });
        let history = Arc::clone(&seen);
        subscription_repo
            .expect_list_by_user()
            .returning(move |_| Ok(history.lock().unwrap().clone().into_iter().collect()));

        let usecase =
            PackageUseCase::new(Arc::new(MockPackageRepository::new()), Arc::new(subscription_repo));
        let check = usecase.check_subscription(user_id).await.unwrap();

        assert!(check.has_active_subscription);
        assert_eq!(check.state, SubscriptionState::Active);
    }

    #[tokio::test]
    async fn create_package_is_admin_only() {
        let user_id = Uuid::new_v4();
        let mut package_repo = MockPackageRepository::new();
        package_repo.expect_create().never();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_reconcile()
            .returning(|id, _| Ok(Some(outcome(id, Role::Premium))));

        let usecase = PackageUseCase::new(Arc::new(package_repo), Arc::new(subscription_repo));
        let err = usecase
            .create_package(
                user_id,
                CreatePackageModel {
                    name: "Yearly".to_string(),
                    description: None,
                    price_minor: Some(99000),
                    duration_days: Some(365),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Forbidden(_)));
    }
}
