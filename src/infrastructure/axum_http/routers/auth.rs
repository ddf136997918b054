use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    application::{
        interfaces::password_hasher::PasswordHasher,
        usecases::{error::UseCaseError, iam::IamUseCase},
    },
    domain::{
        repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
        value_objects::iam::{
            LoginModel, RegisterUserModel, UserEnvelope, UserMessageEnvelope, UserModel,
        },
    },
    infrastructure::{
        axum_http::{
            auth::{AuthUser, SessionKeys},
            error_responses::{MessageResponse, json_rejection},
        },
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{subscriptions::SubscriptionPostgres, users::UserPostgres},
        },
        security::argon2_hasher::Argon2PasswordHasher,
    },
};

/// Login answer; `token` serves clients that send `Authorization: Bearer`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginEnvelope {
    pub message: String,
    pub user: UserModel,
    pub token: String,
}

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
        .route("/register", post(register::<U, S, H>))
        .route("/login", post(login::<U, S, H>))
        .route("/logout", post(logout))
        .route("/me", get(me::<U, S, H>))
        .with_state(iam_usecase)
}

pub async fn register<U, S, H>(
    State(iam_usecase): State<Arc<IamUseCase<U, S, H>>>,
    payload: Result<Json<RegisterUserModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let Json(register_user_model) = payload.map_err(json_rejection)?;
    let user = iam_usecase.register(register_user_model).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserMessageEnvelope {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

pub async fn login<U, S, H>(
    State(iam_usecase): State<Arc<IamUseCase<U, S, H>>>,
    Extension(session_keys): Extension<Arc<SessionKeys>>,
    jar: CookieJar,
    payload: Result<Json<LoginModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let Json(login_model) = payload.map_err(json_rejection)?;
    let user = iam_usecase.login(login_model).await?;
    let token = session_keys.sign(user.id, user.role)?;

    Ok((
        jar.add(session_keys.session_cookie(token.clone())),
        Json(LoginEnvelope {
            message: "Login successful".to_string(),
            user,
            token,
        }),
    ))
}

pub async fn logout(
    Extension(session_keys): Extension<Arc<SessionKeys>>,
    auth_user: Option<AuthUser>,
    jar: CookieJar,
) -> impl IntoResponse {
    if let Some(auth_user) = auth_user {
        info!(user_id = %auth_user.user_id, "auth: logged out");
    }

    (
        jar.add(session_keys.removal_cookie()),
        Json(MessageResponse::new("Logout successful")),
    )
}

pub async fn me<U, S, H>(
    State(iam_usecase): State<Arc<IamUseCase<U, S, H>>>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, UseCaseError>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    H: PasswordHasher + 'static,
{
    let user = iam_usecase.me(auth_user.user_id).await?;

    Ok(Json(UserEnvelope { user }))
}
