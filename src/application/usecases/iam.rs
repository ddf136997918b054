use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::{
        interfaces::password_hasher::PasswordHasher,
        usecases::{
            error::{UseCaseError, UseCaseResult},
            role_resolver::RoleResolver,
        },
    },
    domain::{
        entities::users::{RegisterUserEntity, UserEntity},
        repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
        value_objects::{
            authorization::Operation,
            enums::roles::Role,
            iam::{LoginModel, RegisterOutcome, RegisterUserModel, UserModel},
        },
    },
};

pub struct IamUseCase<U, S, H>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
{
    user_repo: Arc<U>,
    role_resolver: RoleResolver<S>,
    password_hasher: Arc<H>,
}

impl<U, S, H> IamUseCase<U, S, H>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
{
    pub fn new(user_repo: Arc<U>, subscription_repo: Arc<S>, password_hasher: Arc<H>) -> Self {
        Self {
            user_repo,
            role_resolver: RoleResolver::new(subscription_repo),
            password_hasher,
        }
    }

    pub async fn register(&self, register_user_model: RegisterUserModel) -> UseCaseResult<UserModel> {
        register_user_model.validate().map_err(|reason| {
            warn!(%reason, "iam: registration rejected");
            UseCaseError::Validation(reason)
        })?;

        let username = register_user_model.username.trim().to_string();
        self.create_user(
            username,
            register_user_model.email.trim().to_string(),
            &register_user_model.password,
            Role::User,
        )
        .await
    }

    /// Creates the configured admin unless the username is already taken.
    pub async fn bootstrap_admin(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> UseCaseResult<Option<UserModel>> {
        if self
            .user_repo
            .find_by_username(username.clone())
            .await
            .map_err(internal("iam: failed to look up bootstrap admin"))?
            .is_some()
        {
            info!(%username, "iam: bootstrap admin already present");
            return Ok(None);
        }

        let admin = self.create_user(username, email, &password, Role::Admin).await?;
        info!(user_id = %admin.id, "iam: bootstrap admin created");
        Ok(Some(admin))
    }

    async fn create_user(
        &self,
        username: String,
        email: String,
        password: &str,
        role: Role,
    ) -> UseCaseResult<UserModel> {
        let password_hash = self
            .password_hasher
            .hash(password)
            .map_err(internal("iam: password hashing failed"))?;

        let outcome = self
            .user_repo
            .register(RegisterUserEntity {
                username: username.clone(),
                email,
                password_hash,
                role: role.to_string(),
            })
            .await
            .map_err(internal("iam: failed to insert user"))?;

        match outcome {
            RegisterOutcome::Registered(user) => {
                info!(user_id = %user.id, %username, %role, "iam: user registered");
                to_model(user)
            }
            RegisterOutcome::DuplicateUsername => {
                warn!(%username, "iam: username already taken");
                Err(UseCaseError::Conflict("username already exists".to_string()))
            }
            RegisterOutcome::DuplicateEmail => {
                warn!(%username, "iam: email already registered");
                Err(UseCaseError::Conflict("email already exists".to_string()))
            }
        }
    }

    /// Verifies credentials and returns the user with a freshly reconciled role.
    pub async fn login(&self, login_model: LoginModel) -> UseCaseResult<UserModel> {
        if login_model.username.trim().is_empty() || login_model.password.is_empty() {
            return Err(UseCaseError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let user = self
            .user_repo
            .find_by_username(login_model.username.trim().to_string())
            .await
            .map_err(internal("iam: failed to load user for login"))?
            .ok_or_else(|| {
                warn!(username = %login_model.username, "iam: login for unknown username");
                UseCaseError::InvalidCredentials
            })?;

        let verified = self
            .password_hasher
            .verify(&login_model.password, &user.password_hash)
            .map_err(internal("iam: password verification failed"))?;
        if !verified {
            warn!(user_id = %user.id, "iam: login with wrong password");
            return Err(UseCaseError::InvalidCredentials);
        }

        let user = self.reconciled_user(user.id).await?;
        info!(user_id = %user.id, role = %user.role, "iam: login succeeded");
        Ok(user)
    }

    pub async fn me(&self, user_id: Uuid) -> UseCaseResult<UserModel> {
        let resolved = self
            .role_resolver
            .resolve_and_authorize(Some(user_id), Operation::ViewCurrentUser, None)
            .await?;
        current_user(resolved.reconciled.map(|outcome| outcome.user))
    }

    pub async fn list_users(&self, user_id: Uuid) -> UseCaseResult<Vec<UserModel>> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::ListUsers, None)
            .await?;

        let users = self
            .user_repo
            .list()
            .await
            .map_err(internal("iam: failed to list users"))?;
        users.into_iter().map(to_model).collect()
    }

    /// Admin override. A `premium` set here without a backing subscription is
    /// reverted by the target's next reconciliation.
    pub async fn set_role(
        &self,
        user_id: Uuid,
        target_user_id: Uuid,
        role: Role,
    ) -> UseCaseResult<UserModel> {
        self.role_resolver
            .resolve_and_authorize(Some(user_id), Operation::SetUserRole, None)
            .await?;

        let user = self
            .user_repo
            .update_role(target_user_id, role)
            .await
            .map_err(internal("iam: failed to update role"))?
            .ok_or_else(|| UseCaseError::NotFound("user not found".to_string()))?;

        info!(admin_id = %user_id, %target_user_id, %role, "iam: role set by admin");
        to_model(user)
    }

    async fn reconciled_user(&self, user_id: Uuid) -> UseCaseResult<UserModel> {
        let resolved = self.role_resolver.resolve(Some(user_id)).await?;
        current_user(resolved.reconciled.map(|outcome| outcome.user))
    }
}

fn current_user(user: Option<UserEntity>) -> UseCaseResult<UserModel> {
    user.ok_or(UseCaseError::Unauthenticated).and_then(to_model)
}

fn to_model(user: UserEntity) -> UseCaseResult<UserModel> {
    UserModel::try_from(user).map_err(UseCaseError::Internal)
}

fn internal(message: &'static str) -> impl Fn(anyhow::Error) -> UseCaseError {
    move |err| {
        error!(db_error = ?err, "{}", message);
        UseCaseError::Internal(err)
    }
}
