use anyhow::Result;
use async_trait::async_trait;
use diesel::{PgConnection, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::places::{EditPlaceEntity, InsertPlaceEntity, PlaceEntity},
        repositories::places::PlaceRepository,
        value_objects::places::{PlaceListFilter, PlaceRecord},
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{places, users},
    },
};

pub struct PlacePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlacePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn into_record((place, owner_username): (PlaceEntity, String)) -> PlaceRecord {
    PlaceRecord {
        place,
        owner_username,
    }
}

fn find_record(conn: &mut PgConnection, place_id: Uuid) -> QueryResult<Option<PlaceRecord>> {
    places::table
        .inner_join(users::table.on(places::owner_id.eq(users::id)))
        .filter(places::id.eq(place_id))
        .select((PlaceEntity::as_select(), users::username))
        .first::<(PlaceEntity, String)>(conn)
        .optional()
        .map(|row| row.map(into_record))
}

#[async_trait]
impl PlaceRepository for PlacePostgres {
    async fn create(&self, insert_place_entity: InsertPlaceEntity) -> Result<PlaceRecord> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let place_id = insert_into(places::table)
            .values(&insert_place_entity)
            .returning(places::id)
            .get_result::<Uuid>(&mut conn)?;

        find_record(&mut conn, place_id)?
            .ok_or_else(|| anyhow::anyhow!("place {} vanished after insert", place_id))
    }

    async fn find_by_id(&self, place_id: Uuid) -> Result<Option<PlaceRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        Ok(find_record(&mut conn, place_id)?)
    }

    async fn list(&self, filter: PlaceListFilter) -> Result<Vec<PlaceRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let mut query = places::table
            .inner_join(users::table.on(places::owner_id.eq(users::id)))
            .select((PlaceEntity::as_select(), users::username))
            .filter(places::status.eq(filter.status.to_string()))
            .into_boxed();

        if let Some(category) = filter.category {
            query = query.filter(places::category.eq(category.to_string()));
        }

        if let Some(featured) = filter.featured {
            query = query.filter(places::is_featured.eq(featured));
        }

        let results = query
            .order((places::is_featured.desc(), places::created_at.desc()))
            .load::<(PlaceEntity, String)>(&mut conn)?;

        Ok(results.into_iter().map(into_record).collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PlaceRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = places::table
            .inner_join(users::table.on(places::owner_id.eq(users::id)))
            .filter(places::owner_id.eq(owner_id))
            .select((PlaceEntity::as_select(), users::username))
            .order(places::created_at.desc())
            .load::<(PlaceEntity, String)>(&mut conn)?;

        Ok(results.into_iter().map(into_record).collect())
    }

    async fn update(
        &self,
        place_id: Uuid,
        edit_place_entity: EditPlaceEntity,
    ) -> Result<Option<PlaceRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(places::table.find(place_id))
            .set(&edit_place_entity)
            .execute(&mut conn)?;
        if updated == 0 {
            return Ok(None);
        }

        Ok(find_record(&mut conn, place_id)?)
    }

    async fn delete(&self, place_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(places::table.find(place_id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
