use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::{
        error::{UseCaseError, UseCaseResult},
        role_resolver::{RoleResolver, check},
    },
    domain::{
        repositories::{
            advertisements::AdvertisementRepository, places::PlaceRepository,
            subscriptions::SubscriptionRepository,
        },
        value_objects::{
            advertisements::{
                AdvertisementModel, AdvertisementRecord, CreateAdvertisementModel,
                UpdateAdvertisementModel, is_publicly_visible,
            },
            authorization::Operation,
        },
    },
};

pub struct AdvertisementUseCase<A, P, S>
where
    A: AdvertisementRepository + Send + Sync + 'static,
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    advertisement_repo: Arc<A>,
    place_repo: Arc<P>,
    role_resolver: RoleResolver<S>,
}

impl<A, P, S> AdvertisementUseCase<A, P, S>
where
    A: AdvertisementRepository + Send + Sync + 'static,
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(advertisement_repo: Arc<A>, place_repo: Arc<P>, subscription_repo: Arc<S>) -> Self {
        Self {
            advertisement_repo,
            place_repo,
            role_resolver: RoleResolver::new(subscription_repo),
        }
    }

    pub async fn list_public(&self) -> UseCaseResult<Vec<AdvertisementModel>> {
        let now = Utc::now();
        let records = self
            .advertisement_repo
            .list_visible(now)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "advertisements: failed to list public feed");
                UseCaseError::Internal(err)
            })?;

        let visible: Vec<AdvertisementModel> = records
            .into_iter()
            .filter(|record| is_publicly_visible(&record.advertisement, now))
            .map(AdvertisementModel::from)
            .collect();

        info!(ad_count = visible.len(), "advertisements: public feed loaded");
        Ok(visible)
    }

    pub async fn list_mine(&self, user_id: Uuid) -> UseCaseResult<Vec<AdvertisementModel>> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::ListMyAdvertisements, None)
            .await?;

        let records = self
            .advertisement_repo
            .list_by_owner(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "advertisements: failed to list own ads");
                UseCaseError::Internal(err)
            })?;

        Ok(records.into_iter().map(AdvertisementModel::from).collect())
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        create_advertisement_model: CreateAdvertisementModel,
    ) -> UseCaseResult<AdvertisementModel> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::CreateAdvertisement, None)
            .await?;

        let entity = create_advertisement_model
            .to_entity(user_id, Utc::now())
            .map_err(|reason| {
                warn!(%user_id, %reason, "advertisements: ad rejected");
                UseCaseError::Validation(reason)
            })?;

        if let Some(place_id) = entity.place_id {
            self.ensure_place_exists(place_id).await?;
        }

        let record = self.advertisement_repo.create(entity).await.map_err(|err| {
            error!(%user_id, db_error = ?err, "advertisements: failed to create ad");
            UseCaseError::Internal(err)
        })?;

        info!(
            %user_id,
            advertisement_id = %record.advertisement.id,
            end_date = %record.advertisement.end_date,
            "advertisements: ad created"
        );
        Ok(AdvertisementModel::from(record))
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        advertisement_id: Uuid,
        update_advertisement_model: UpdateAdvertisementModel,
    ) -> UseCaseResult<AdvertisementModel> {
        let resolved = self.role_resolver.resolve(Some(user_id)).await?;
        let current = self.find(advertisement_id).await?;

        check(
            &resolved.actor,
            Operation::UpdateAdvertisement,
            Some(current.advertisement.owner_id),
        )?;

        let edit = update_advertisement_model
            .to_edit_entity(&current.advertisement, Utc::now())
            .map_err(UseCaseError::Validation)?;

        if let Some(place_id) = update_advertisement_model.place_id_to_link() {
            self.ensure_place_exists(place_id).await?;
        }

        let record = self
            .advertisement_repo
            .update(advertisement_id, edit)
            .await
            .map_err(|err| {
                error!(%user_id, %advertisement_id, db_error = ?err, "advertisements: failed to update ad");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound("advertisement not found".to_string()))?;

        info!(%user_id, %advertisement_id, "advertisements: ad updated");
        Ok(AdvertisementModel::from(record))
    }

    pub async fn delete(&self, user_id: Uuid, advertisement_id: Uuid) -> UseCaseResult<()> {
        let resolved = self.role_resolver.resolve(Some(user_id)).await?;
        let current = self.find(advertisement_id).await?;

        check(
            &resolved.actor,
            Operation::DeleteAdvertisement,
            Some(current.advertisement.owner_id),
        )?;

        let deleted = self
            .advertisement_repo
            .delete(advertisement_id)
            .await
            .map_err(|err| {
                error!(%user_id, %advertisement_id, db_error = ?err, "advertisements: failed to delete ad");
                UseCaseError::Internal(err)
            })?;
        if !deleted {
            return Err(UseCaseError::NotFound("advertisement not found".to_string()));
        }

        info!(%user_id, %advertisement_id, "advertisements: ad deleted");
        Ok(())
    }

    async fn find(&self, advertisement_id: Uuid) -> UseCaseResult<AdvertisementRecord> {
        self.advertisement_repo
            .find_by_id(advertisement_id)
            .await
            .map_err(|err| {
                error!(%advertisement_id, db_error = ?err, "advertisements: failed to load ad");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%advertisement_id, "advertisements: ad not found");
                UseCaseError::NotFound("advertisement not found".to_string())
            })
    }

    async fn ensure_place_exists(&self, place_id: Uuid) -> UseCaseResult<()> {
        let place = self.place_repo.find_by_id(place_id).await.map_err(|err| {
            error!(%place_id, db_error = ?err, "advertisements: failed to load linked place");
            UseCaseError::Internal(err)
        })?;
        match place {
            Some(_) => Ok(()),
            None => {
                warn!(%place_id, "advertisements: linked place does not exist");
                Err(UseCaseError::NotFound("place not found".to_string()))
            }
        }
    }
}
