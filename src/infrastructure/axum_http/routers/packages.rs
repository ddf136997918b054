use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    application::usecases::{error::UseCaseError, packages::PackageUseCase},
    domain::{
        repositories::{packages::PackageRepository, subscriptions::SubscriptionRepository},
        value_objects::{
            packages::{CreatePackageModel, PackageMessageEnvelope},
            subscriptions::{SubscribeModel, SubscriptionMessageEnvelope},
        },
    },
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::json_rejection},
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{packages::PackagePostgres, subscriptions::SubscriptionPostgres},
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let package_repository = PackagePostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let package_usecase = PackageUseCase::new(
        Arc::new(package_repository),
        Arc::new(subscription_repository),
    );

    router(Arc::new(package_usecase))
}

pub fn router<P, S>(package_usecase: Arc<PackageUseCase<P, S>>) -> Router
where
    P: PackageRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_packages::<P, S>).post(create_package::<P, S>))
        .route("/subscribe", post(subscribe::<P, S>))
        .route("/my-subscriptions", get(my_subscriptions::<P, S>))
        .route("/check-subscription", get(check_subscription::<P, S>))
        .with_state(package_usecase)
}

pub async fn list_packages<P, S>(
    State(package_usecase): State<Arc<PackageUseCase<P, S>>>,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PackageRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Ok(Json(package_usecase.list_packages().await?))
}

pub async fn create_package<P, S>(
    State(package_usecase): State<Arc<PackageUseCase<P, S>>>,
    auth_user: AuthUser,
    payload: Result<Json<CreatePackageModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PackageRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Json(create_package_model) = payload.map_err(json_rejection)?;
    let package = package_usecase
        .create_package(auth_user.user_id, create_package_model)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PackageMessageEnvelope {
            message: "Package created successfully".to_string(),
            package,
        }),
    ))
}

pub async fn subscribe<P, S>(
    State(package_usecase): State<Arc<PackageUseCase<P, S>>>,
    auth_user: AuthUser,
    payload: Result<Json<SubscribeModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PackageRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Json(subscribe_model) = payload.map_err(json_rejection)?;
    let subscription = package_usecase
        .subscribe(auth_user.user_id, subscribe_model)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionMessageEnvelope {
            message: "Subscribed successfully".to_string(),
            subscription,
        }),
    ))
}

pub async fn my_subscriptions<P, S>(
    State(package_usecase): State<Arc<PackageUseCase<P, S>>>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PackageRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Ok(Json(
        package_usecase.my_subscriptions(auth_user.user_id).await?,
    ))
}

pub async fn check_subscription<P, S>(
    State(package_usecase): State<Arc<PackageUseCase<P, S>>>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PackageRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Ok(Json(
        package_usecase.check_subscription(auth_user.user_id).await?,
    ))
}
