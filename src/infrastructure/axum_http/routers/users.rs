use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    application::{
        interfaces::password_hasher::PasswordHasher,
        usecases::{error::UseCaseError, iam::IamUseCase},
    },
    domain::{
        repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
        value_objects::iam::{SetRoleModel, UserMessageEnvelope},
    },
    infrastructure::{
        axum_http::{
            auth::AuthUser,
            error_responses::{json_rejection, path_rejection},
        },
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{subscriptions::SubscriptionPostgres, users::UserPostgres},
        },
        security::argon2_hasher::Argon2PasswordHasher,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let iam_usecase = IamUseCase::new(
        Arc::new(user_repository),
        Arc::new(subscription_repository),
        Arc::new(Argon2PasswordHasher),
    );

    router(Arc::new(iam_usecase))
}

pub fn router<U, S, H>(iam_usecase: Arc<IamUseCase<U, S, H>>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
{
    Router::new()
        .route("/", get(list_users::<U, S, H>))
        .route("/:id/role", put(set_role::<U, S, H>))
        .with_state(iam_usecase)
}

pub async fn list_users<U, S, H>(
    State(iam_usecase): State<Arc<IamUseCase<U, S, H>>>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, UseCaseError>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
{
    Ok(Json(iam_usecase.list_users(auth_user.user_id).await?))
}

pub async fn set_role<U, S, H>(
    State(iam_usecase): State<Arc<IamUseCase<U, S, H>>>,
    auth_user: AuthUser,
    target_user_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SetRoleModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let Path(target_user_id) = target_user_id.map_err(path_rejection)?;
    let Json(set_role_model) = payload.map_err(json_rejection)?;
    let user = iam_usecase
        .set_role(auth_user.user_id, target_user_id, set_role_model.role)
        .await?;

    Ok(Json(UserMessageEnvelope {
        message: "Role updated successfully".to_string(),
        user,
    }))
}
