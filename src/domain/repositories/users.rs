use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::users::{RegisterUserEntity, UserEntity},
    value_objects::{enums::roles::Role, iam::RegisterOutcome},
};

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>>;

    async fn find_by_username(&self, username: String) -> Result<Option<UserEntity>>;

    /// Duplicate username/email come back as outcomes, not errors.
    async fn register(&self, register_user_entity: RegisterUserEntity) -> Result<RegisterOutcome>;

    async fn list(&self) -> Result<Vec<UserEntity>>;

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserEntity>>;
}
