use anyhow::Result;
use async_trait::async_trait;
use diesel::{insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::packages::{InsertPackageEntity, PackageEntity},
        repositories::packages::PackageRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::packages},
};

pub struct PackagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PackagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PackageRepository for PackagePostgres {
    async fn list(&self) -> Result<Vec<PackageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = packages::table
            .select(PackageEntity::as_select())
            .order((packages::price_minor.asc(), packages::created_at.asc()))
            .load::<PackageEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_by_id(&self, package_id: Uuid) -> Result<Option<PackageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = packages::table
            .find(package_id)
            .select(PackageEntity::as_select())
            .first::<PackageEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create(&self, insert_package_entity: InsertPackageEntity) -> Result<PackageEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(packages::table)
            .values(&insert_package_entity)
            .returning(PackageEntity::as_returning())
            .get_result::<PackageEntity>(&mut conn)?;

        Ok(result)
    }
}
