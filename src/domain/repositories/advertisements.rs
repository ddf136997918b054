use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::advertisements::{EditAdvertisementEntity, InsertAdvertisementEntity},
    value_objects::advertisements::AdvertisementRecord,
};

#[automock]
#[async_trait]
pub trait AdvertisementRepository {
    async fn create(
        &self,
        insert_advertisement_entity: InsertAdvertisementEntity,
    ) -> Result<AdvertisementRecord>;

    async fn find_by_id(&self, advertisement_id: Uuid) -> Result<Option<AdvertisementRecord>>;

    /// Active ads whose window contains `now`, newest first.
    async fn list_visible(&self, now: DateTime<Utc>) -> Result<Vec<AdvertisementRecord>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<AdvertisementRecord>>;

    async fn update(
        &self,
        advertisement_id: Uuid,
        edit_advertisement_entity: EditAdvertisementEntity,
    ) -> Result<Option<AdvertisementRecord>>;

    async fn delete(&self, advertisement_id: Uuid) -> Result<bool>;
}
