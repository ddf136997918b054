use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{entities::users::UserEntity, value_objects::enums::roles::Role};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserEntity> for UserModel {
    type Error = anyhow::Error;

    fn try_from(entity: UserEntity) -> Result<Self, Self::Error> {
        let role = Role::from_str(&entity.role).map_err(|err| anyhow!(err))?;
        Ok(Self {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            role,
            created_at: entity.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserEnvelope {
    pub user: UserModel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserMessageEnvelope {
    pub message: String,
    pub user: UserModel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterUserModel {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

impl RegisterUserModel {
    /// Self-registration only ever yields `Role::User`.
    pub fn validate(&self) -> Result<(), String> {
        let username_len = self.username.trim().chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
            return Err(format!(
                "username must be between {} and {} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ));
        }

        if !is_email_shaped(self.email.trim()) {
            return Err("email is not valid".to_string());
        }

        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(format!(
                "password must be at least {} characters",
                PASSWORD_MIN_LEN
            ));
        }

        match self.role.as_deref() {
            None => Ok(()),
            Some(role) if Role::from_str(role) == Ok(Role::User) => Ok(()),
            Some(role) => Err(format!("role '{}' cannot be self-assigned", role)),
        }
    }
}

fn is_email_shaped(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !email.chars().any(char::is_whitespace)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginModel {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRoleModel {
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Registered(UserEntity),
    DuplicateUsername,
    DuplicateEmail,
}
