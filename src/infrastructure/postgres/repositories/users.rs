use anyhow::Result;
use async_trait::async_trait;
use diesel::{
    dsl::{exists, select},
    insert_into,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    update,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::users::{RegisterUserEntity, UserEntity},
        repositories::users::UserRepository,
        value_objects::{enums::roles::Role, iam::RegisterOutcome},
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::users},
};

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .find(user_id)
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_username(&self, username: String) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = users::table
            .filter(users::username.eq(username))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn register(&self, register_user_entity: RegisterUserEntity) -> Result<RegisterOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let username_taken = select(exists(
            users::table.filter(users::username.eq(&register_user_entity.username)),
        ))
        .get_result::<bool>(&mut conn)?;
        if username_taken {
            return Ok(RegisterOutcome::DuplicateUsername);
        }

        let email_taken = select(exists(
            users::table.filter(users::email.eq(&register_user_entity.email)),
        ))
        .get_result::<bool>(&mut conn)?;
        if email_taken {
            return Ok(RegisterOutcome::DuplicateEmail);
        }

        // The unique constraints settle any race with a concurrent registration.
        let inserted = insert_into(users::table)
            .values(&register_user_entity)
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn);

        match inserted {
            Ok(user) => Ok(RegisterOutcome::Registered(user)),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
                match info.constraint_name() {
                    Some(EMAIL_CONSTRAINT) => Ok(RegisterOutcome::DuplicateEmail),
                    Some(USERNAME_CONSTRAINT) | None => Ok(RegisterOutcome::DuplicateUsername),
                    Some(other) => Err(anyhow::anyhow!(
                        "unexpected unique violation on {}",
                        other
                    )),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self) -> Result<Vec<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = users::table
            .select(UserEntity::as_select())
            .order(users::created_at.desc())
            .load::<UserEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(users::table.find(user_id))
            .set(users::role.eq(role.to_string()))
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
