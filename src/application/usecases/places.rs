use std::{cmp::Reverse, sync::Arc};

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::{
        error::{UseCaseError, UseCaseResult},
        role_resolver::{RoleResolver, check},
    },
    domain::{
        repositories::{places::PlaceRepository, subscriptions::SubscriptionRepository},
        value_objects::{
            authorization::Operation,
            enums::place_statuses::PlaceStatus,
            places::{
                CategoryModel, CreatePlaceModel, ListPlacesQuery, PlaceListFilter, PlaceModel,
                PlaceRecord, UpdatePlaceModel, categories, sort_for_listing, to_edit_entity,
            },
        },
    },
};

pub struct PlaceUseCase<P, S>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    place_repo: Arc<P>,
    role_resolver: RoleResolver<S>,
}

impl<P, S> PlaceUseCase<P, S>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(place_repo: Arc<P>, subscription_repo: Arc<S>) -> Self {
        Self {
            place_repo,
            role_resolver: RoleResolver::new(subscription_repo),
        }
    }

    pub fn categories(&self) -> Vec<CategoryModel> {
        categories()
    }

    /// Public for approved places; any other status filter is an admin view.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        query: ListPlacesQuery,
    ) -> UseCaseResult<Vec<PlaceModel>> {
        let filter = PlaceListFilter::from(&query);
        if filter.status != PlaceStatus::Approved {
            self.role_resolver
                .resolve_and_authorize(user_id, Operation::ListPlacesByStatus, None)
                .await?;
        }

        let mut records = self.place_repo.list(filter).await.map_err(|err| {
            error!(db_error = ?err, ?filter, "places: failed to list places");
            UseCaseError::Internal(err)
        })?;
        sort_for_listing(&mut records);

        info!(place_count = records.len(), status = %filter.status, "places: places listed");
        to_models(records)
    }

    pub async fn list_pending(&self, user_id: Uuid) -> UseCaseResult<Vec<PlaceModel>> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::ListPlacesByStatus, None)
            .await?;

        let filter = PlaceListFilter {
            status: PlaceStatus::Pending,
            category: None,
            featured: None,
        };
        let mut records = self.place_repo.list(filter).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "places: failed to list pending places");
            UseCaseError::Internal(err)
        })?;
        records.sort_by_key(|record| Reverse(record.place.created_at));

        to_models(records)
    }

    pub async fn list_mine(&self, user_id: Uuid) -> UseCaseResult<Vec<PlaceModel>> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::ListMyPlaces, None)
            .await?;

        let records = self.place_repo.list_by_owner(user_id).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "places: failed to list own places");
            UseCaseError::Internal(err)
        })?;

        to_models(records)
    }

    pub async fn get(&self, place_id: Uuid) -> UseCaseResult<PlaceModel> {
        let record = self.find(place_id).await?;
        to_model(record)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        create_place_model: CreatePlaceModel,
    ) -> UseCaseResult<PlaceModel> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::CreatePlace, None)
            .await?;

        let entity = create_place_model.to_entity(user_id).map_err(|reason| {
            warn!(%user_id, %reason, "places: place rejected");
            UseCaseError::Validation(reason)
        })?;

        let record = self.place_repo.create(entity).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "places: failed to create place");
            UseCaseError::Internal(err)
        })?;

        info!(%user_id, place_id = %record.place.id, "places: place submitted for review");
        to_model(record)
    }

    /// Owners edit descriptive fields; `status` and `is_featured` need admin.
    /// Nothing is written unless every field in the request is allowed.
    pub async fn update(
        &self,
        user_id: Uuid,
        place_id: Uuid,
        update_place_model: UpdatePlaceModel,
    ) -> UseCaseResult<PlaceModel> {
        let resolved = self.role_resolver.resolve(Some(user_id)).await?;
        let current = self.find(place_id).await?;

        check(
            &resolved.actor,
            Operation::UpdatePlace,
            Some(current.place.owner_id),
        )?;

        let (owner_patch, moderation_patch) = update_place_model.split();
        if !moderation_patch.is_empty() {
            check(&resolved.actor, Operation::ModeratePlace, None)?;
        }

        let edit = to_edit_entity(owner_patch, moderation_patch.clone(), Utc::now())
            .map_err(UseCaseError::Validation)?;

        let record = self
            .place_repo
            .update(place_id, edit)
            .await
            .map_err(|err| {
                error!(%user_id, %place_id, db_error = ?err, "places: failed to update place");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound("place not found".to_string()))?;

        if moderation_patch.is_empty() {
            info!(%user_id, %place_id, "places: place updated");
        } else {
            info!(
                %user_id,
                %place_id,
                status = ?moderation_patch.status,
                is_featured = ?moderation_patch.is_featured,
                "places: place moderated"
            );
        }
        to_model(record)
    }

    pub async fn delete(&self, user_id: Uuid, place_id: Uuid) -> UseCaseResult<()> {
        let resolved = self.role_resolver.resolve(Some(user_id)).await?;
        let current = self.find(place_id).await?;

        check(
            &resolved.actor,
            Operation::DeletePlace,
            Some(current.place.owner_id),
        )?;

        let deleted = self.place_repo.delete(place_id).await.map_err(|err| {
            error!(%user_id, %place_id, db_error = ?err, "places: failed to delete place");
            UseCaseError::Internal(err)
        })?;
        if !deleted {
            return Err(UseCaseError::NotFound("place not found".to_string()));
        }

        info!(%user_id, %place_id, "places: place deleted");
        Ok(())
    }

    async fn find(&self, place_id: Uuid) -> UseCaseResult<PlaceRecord> {
        self.place_repo
            .find_by_id(place_id)
            .await
            .map_err(|err| {
                error!(%place_id, db_error = ?err, "places: failed to load place");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%place_id, "places: place not found");
                UseCaseError::NotFound("place not found".to_string())
            })
    }
}

fn to_model(record: PlaceRecord) -> UseCaseResult<PlaceModel> {
    PlaceModel::try_from(record).map_err(UseCaseError::Internal)
}

fn to_models(records: Vec<PlaceRecord>) -> UseCaseResult<Vec<PlaceModel>> {
    records.into_iter().map(to_model).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::usecases::role_resolver::test_support::reconciling_as,
        domain::{
            entities::places::PlaceEntity,
            repositories::{
                places::MockPlaceRepository, subscriptions::MockSubscriptionRepository,
            },
            value_objects::enums::{place_categories::PlaceCategory, roles::Role},
        },
    };
    use chrono::{DateTime, Duration};
    use mockall::predicate::eq;

    fn record(place_id: Uuid, owner_id: Uuid, created_at: DateTime<Utc>) -> PlaceRecord {
        PlaceRecord {
            place: PlaceEntity {
                id: place_id,
                name: "Corner Cafe".to_string(),
                description: String::new(),
                address: "1 Main St".to_string(),
                phone: String::new(),
                website: String::new(),
                category: PlaceCategory::Restaurant.to_string(),
                owner_id,
                status: PlaceStatus::Pending.to_string(),
                is_featured: false,
                image_url: String::new(),
                created_at,
                updated_at: created_at,
            },
            owner_username: "owner".to_string(),
        }
    }

    fn place_repo_with(place_id: Uuid, owner_id: Uuid) -> MockPlaceRepository {
        let mut place_repo = MockPlaceRepository::new();
        place_repo
            .expect_find_by_id()
            .with(eq(place_id))
            .returning(move |id| Ok(Some(record(id, owner_id, Utc::now()))));
        place_repo
    }

    #[tokio::test]
    async fn non_owner_update_is_forbidden_and_writes_nothing() {
        let owner_id = Uuid::new_v4();
        let stranger_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();

        let mut place_repo = place_repo_with(place_id, owner_id);
        place_repo.expect_update().never();

        let usecase = PlaceUseCase::new(
            Arc::new(place_repo),
            Arc::new(reconciling_as(stranger_id, Role::User)),
        );

        let err = usecase
            .update(
                stranger_id,
                place_id,
                UpdatePlaceModel {
                    name: Some("Mine now".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Forbidden(_)));
        assert_eq!(err.status_code().as_u16(), 403);
    }

    #[tokio::test]
    async fn owner_cannot_moderate_own_place() {
        let owner_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();

        let mut place_repo = place_repo_with(place_id, owner_id);
        place_repo.expect_update().never();

        let usecase = PlaceUseCase::new(
            Arc::new(place_repo),
            Arc::new(reconciling_as(owner_id, Role::Premium)),
        );

        let err = usecase
            .update(
                owner_id,
                place_id,
                UpdatePlaceModel {
                    name: Some("Corner Cafe & Bakery".to_string()),
                    is_featured: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn owner_updates_descriptive_fields() {
        let owner_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();

        let mut place_repo = place_repo_with(place_id, owner_id);
        place_repo
            .expect_update()
            .withf(move |id, edit| {
                *id == place_id
                    && edit.phone.as_deref() == Some("555-0100")
                    && edit.status.is_none()
                    && edit.is_featured.is_none()
            })
            .times(1)
            .returning(move |id, _| Ok(Some(record(id, owner_id, Utc::now()))));

        let usecase = PlaceUseCase::new(
            Arc::new(place_repo),
            Arc::new(reconciling_as(owner_id, Role::User)),
        );

        let place = usecase
            .update(
                owner_id,
                place_id,
                UpdatePlaceModel {
                    phone: Some("555-0100".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(place.id, place_id);
    }

    #[tokio::test]
    async fn admin_approves_and_features() {
        let admin_id = Uuid::new_v4();
        let place_id = Uuid::new_v4();

        let mut place_repo = place_repo_with(place_id, Uuid::new_v4());
        place_repo
            .expect_update()
            .withf(|_, edit| {
                edit.status.as_deref() == Some("approved") && edit.is_featured == Some(true)
            })
            .times(1)
            .returning(|id, _| {
                let mut updated = record(id, Uuid::new_v4(), Utc::now());
                updated.place.status = PlaceStatus::Approved.to_string();
                updated.place.is_featured = true;
                Ok(Some(updated))
            });

        let usecase = PlaceUseCase::new(
            Arc::new(place_repo),
            Arc::new(reconciling_as(admin_id, Role::Admin)),
        );

        let place = usecase
            .update(
                admin_id,
                place_id,
                UpdatePlaceModel {
                    status: Some(PlaceStatus::Approved),
                    is_featured: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(place.status, PlaceStatus::Approved);
        assert!(place.is_featured);
    }

    #[tokio::test]
    async fn missing_place_is_not_found() {
        let user_id = Uuid::new_v4();
        let mut place_repo = MockPlaceRepository::new();
        place_repo.expect_find_by_id().returning(|_| Ok(None));
        place_repo.expect_delete().never();

        let usecase = PlaceUseCase::new(
            Arc::new(place_repo),
            Arc::new(reconciling_as(user_id, Role::Admin)),
        );

        let err = usecase.delete(user_id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn public_listing_skips_reconciliation() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_reconcile().never();

        let base = Utc::now();
        let mut place_repo = MockPlaceRepository::new();
        place_repo
            .expect_list()
            .withf(|filter| filter.status == PlaceStatus::Approved)
            .returning(move |_| {
                let plain = record(Uuid::new_v4(), Uuid::new_v4(), base);
                let mut featured = record(Uuid::new_v4(), Uuid::new_v4(), base - Duration::days(3));
                featured.place.is_featured = true;
                Ok(vec![plain, featured])
            });

        let usecase = PlaceUseCase::new(Arc::new(place_repo), Arc::new(subscription_repo));
        let places = usecase.list(None, ListPlacesQuery::default()).await.unwrap();

        assert_eq!(places.len(), 2);
        assert!(places[0].is_featured);
    }

    #[tokio::test]
    async fn status_filter_needs_admin() {
        let mut place_repo = MockPlaceRepository::new();
        place_repo.expect_list().never();
        let usecase = PlaceUseCase::new(
            Arc::new(place_repo),
            Arc::new(MockSubscriptionRepository::new()),
        );

        let query = ListPlacesQuery {
            status: Some(PlaceStatus::Rejected),
            ..Default::default()
        };
        let err = usecase.list(None, query).await.unwrap_err();
        assert!(matches!(err, UseCaseError::Unauthenticated));

        let user_id = Uuid::new_v4();
        let mut place_repo = MockPlaceRepository::new();
        place_repo.expect_list().never();
        let usecase = PlaceUseCase::new(
            Arc::new(place_repo),
            Arc::new(reconciling_as(user_id, Role::Premium)),
        );
        let query = ListPlacesQuery {
            status: Some(PlaceStatus::Pending),
            ..Default::default()
        };
        let err = usecase.list(Some(user_id), query).await.unwrap_err();
        assert!(matches!(err, UseCaseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn create_starts_pending() {
        let user_id = Uuid::new_v4();
        let mut place_repo = MockPlaceRepository::new();
        place_repo
            .expect_create()
            .withf(move |entity| entity.status == "pending" && entity.owner_id == user_id)
            .returning(move |entity| {
                let mut created = record(Uuid::new_v4(), entity.owner_id, Utc::now());
                created.place.name = entity.name;
                Ok(created)
            });

        let usecase = PlaceUseCase::new(
            Arc::new(place_repo),
            Arc::new(reconciling_as(user_id, Role::User)),
        );

        let place = usecase
            .create(
                user_id,
                CreatePlaceModel {
                    name: "Night Pharmacy".to_string(),
                    category: Some("pharmacy".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(place.status, PlaceStatus::Pending);
        assert_eq!(place.name, "Night Pharmacy");
    }
}
