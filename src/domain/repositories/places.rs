use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::places::{EditPlaceEntity, InsertPlaceEntity},
    value_objects::places::{PlaceListFilter, PlaceRecord},
};

#[automock]
#[async_trait]
pub trait PlaceRepository {
    async fn create(&self, insert_place_entity: InsertPlaceEntity) -> Result<PlaceRecord>;

    async fn find_by_id(&self, place_id: Uuid) -> Result<Option<PlaceRecord>>;

    /// Featured first, then newest first.
    async fn list(&self, filter: PlaceListFilter) -> Result<Vec<PlaceRecord>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PlaceRecord>>;

    async fn update(
        &self,
        place_id: Uuid,
        edit_place_entity: EditPlaceEntity,
    ) -> Result<Option<PlaceRecord>>;

    async fn delete(&self, place_id: Uuid) -> Result<bool>;
}
