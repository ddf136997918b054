use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::packages::{InsertPackageEntity, PackageEntity};

#[automock]
#[async_trait]
pub trait PackageRepository {
    async fn list(&self) -> Result<Vec<PackageEntity>>;

    async fn find_by_id(&self, package_id: Uuid) -> Result<Option<PackageEntity>>;

    async fn create(&self, insert_package_entity: InsertPackageEntity) -> Result<PackageEntity>;
}
