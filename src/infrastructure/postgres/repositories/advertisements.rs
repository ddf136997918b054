use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{PgConnection, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::advertisements::{
            AdvertisementEntity, EditAdvertisementEntity, InsertAdvertisementEntity,
        },
        repositories::advertisements::AdvertisementRepository,
        value_objects::advertisements::AdvertisementRecord,
    },
    infrastructure::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{advertisements, places, users},
    },
};

type AdvertisementRow = (AdvertisementEntity, String, Option<String>);

pub struct AdvertisementPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AdvertisementPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn into_record((advertisement, owner_username, place_name): AdvertisementRow) -> AdvertisementRecord {
    AdvertisementRecord {
        advertisement,
        owner_username,
        place_name,
    }
}

fn find_record(
    conn: &mut PgConnection,
    advertisement_id: Uuid,
) -> QueryResult<Option<AdvertisementRecord>> {
    advertisements::table
        .inner_join(users::table.on(advertisements::owner_id.eq(users::id)))
        .left_join(places::table.on(advertisements::place_id.eq(places::id.nullable())))
        .filter(advertisements::id.eq(advertisement_id))
        .select((
            AdvertisementEntity::as_select(),
            users::username,
            places::name.nullable(),
        ))
        .first::<AdvertisementRow>(conn)
        .optional()
        .map(|row| row.map(into_record))
}

#[async_trait]
impl AdvertisementRepository for AdvertisementPostgres {
    async fn create(
        &self,
        insert_advertisement_entity: InsertAdvertisementEntity,
    ) -> Result<AdvertisementRecord> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let advertisement_id = insert_into(advertisements::table)
            .values(&insert_advertisement_entity)
            .returning(advertisements::id)
            .get_result::<Uuid>(&mut conn)?;

        find_record(&mut conn, advertisement_id)?.ok_or_else(|| {
            anyhow::anyhow!("advertisement {} vanished after insert", advertisement_id)
        })
    }

    async fn find_by_id(&self, advertisement_id: Uuid) -> Result<Option<AdvertisementRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        Ok(find_record(&mut conn, advertisement_id)?)
    }

    async fn list_visible(&self, now: DateTime<Utc>) -> Result<Vec<AdvertisementRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = advertisements::table
            .inner_join(users::table.on(advertisements::owner_id.eq(users::id)))
            .left_join(places::table.on(advertisements::place_id.eq(places::id.nullable())))
            .filter(advertisements::is_active.eq(true))
            .filter(advertisements::start_date.le(now))
            .filter(advertisements::end_date.ge(now))
            .select((
                AdvertisementEntity::as_select(),
                users::username,
                places::name.nullable(),
            ))
            .order(advertisements::created_at.desc())
            .load::<AdvertisementRow>(&mut conn)?;

        Ok(results.into_iter().map(into_record).collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<AdvertisementRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = advertisements::table
            .inner_join(users::table.on(advertisements::owner_id.eq(users::id)))
            .left_join(places::table.on(advertisements::place_id.eq(places::id.nullable())))
            .filter(advertisements::owner_id.eq(owner_id))
            .select((
                AdvertisementEntity::as_select(),
                users::username,
                places::name.nullable(),
            ))
            .order(advertisements::created_at.desc())
            .load::<AdvertisementRow>(&mut conn)?;

        Ok(results.into_iter().map(into_record).collect())
    }

    async fn update(
        &self,
        advertisement_id: Uuid,
        edit_advertisement_entity: EditAdvertisementEntity,
    ) -> Result<Option<AdvertisementRecord>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(advertisements::table.find(advertisement_id))
            .set(&edit_advertisement_entity)
            .execute(&mut conn)?;
        if updated == 0 {
            return Ok(None);
        }

        Ok(find_record(&mut conn, advertisement_id)?)
    }

    async fn delete(&self, advertisement_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(advertisements::table.find(advertisement_id)).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
