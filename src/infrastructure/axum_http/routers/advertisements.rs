use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    application::usecases::{advertisements::AdvertisementUseCase, error::UseCaseError},
    domain::{
        repositories::{
            advertisements::AdvertisementRepository, places::PlaceRepository,
            subscriptions::SubscriptionRepository,
        },
        value_objects::advertisements::{
            AdvertisementMessageEnvelope, CreateAdvertisementModel, UpdateAdvertisementModel,
        },
    },
    infrastructure::{
        axum_http::{
            auth::AuthUser,
            error_responses::{MessageResponse, json_rejection, path_rejection},
        },
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                advertisements::AdvertisementPostgres, places::PlacePostgres,
                subscriptions::SubscriptionPostgres,
            },
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let advertisement_repository = AdvertisementPostgres::new(Arc::clone(&db_pool));
    let place_repository = PlacePostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let advertisement_usecase = AdvertisementUseCase::new(
        Arc::new(advertisement_repository),
        Arc::new(place_repository),
        Arc::new(subscription_repository),
    );

    router(Arc::new(advertisement_usecase))
}

pub fn router<A, P, S>(advertisement_usecase: Arc<AdvertisementUseCase<A, P, S>>) -> Router
where
    A: AdvertisementRepository + Send + Sync + 'static,
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_public::<A, P, S>).post(create::<A, P, S>))
        .route("/my-ads", get(list_mine::<A, P, S>))
        .route("/:id", put(update::<A, P, S>).delete(remove::<A, P, S>))
        .with_state(advertisement_usecase)
}

pub async fn list_public<A, P, S>(
    State(advertisement_usecase): State<Arc<AdvertisementUseCase<A, P, S>>>,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: AdvertisementRepository + Send + Sync + 'static,
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Ok(Json(advertisement_usecase.list_public().await?))
}

pub async fn list_mine<A, P, S>(
    State(advertisement_usecase): State<Arc<AdvertisementUseCase<A, P, S>>>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: AdvertisementRepository + Send + Sync + 'static,
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Ok(Json(
        advertisement_usecase.list_mine(auth_user.user_id).await?,
    ))
}

pub async fn create<A, P, S>(
    State(advertisement_usecase): State<Arc<AdvertisementUseCase<A, P, S>>>,
    auth_user: AuthUser,
    payload: Result<Json<CreateAdvertisementModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: AdvertisementRepository + Send + Sync + 'static,
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Json(create_advertisement_model) = payload.map_err(json_rejection)?;
    let advertisement = advertisement_usecase
        .create(auth_user.user_id, create_advertisement_model)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AdvertisementMessageEnvelope {
            message: "Advertisement created successfully".to_string(),
            advertisement,
        }),
    ))
}

pub async fn update<A, P, S>(
    State(advertisement_usecase): State<Arc<AdvertisementUseCase<A, P, S>>>,
    auth_user: AuthUser,
    advertisement_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateAdvertisementModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: AdvertisementRepository + Send + Sync + 'static,
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Path(advertisement_id) = advertisement_id.map_err(path_rejection)?;
    let Json(update_advertisement_model) = payload.map_err(json_rejection)?;
    let advertisement = advertisement_usecase
        .update(auth_user.user_id, advertisement_id, update_advertisement_model)
        .await?;

    Ok(Json(AdvertisementMessageEnvelope {
        message: "Advertisement updated successfully".to_string(),
        advertisement,
    }))
}

pub async fn remove<A, P, S>(
    State(advertisement_usecase): State<Arc<AdvertisementUseCase<A, P, S>>>,
    auth_user: AuthUser,
    advertisement_id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: AdvertisementRepository + Send + Sync + 'static,
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Path(advertisement_id) = advertisement_id.map_err(path_rejection)?;
    advertisement_usecase
        .delete(auth_user.user_id, advertisement_id)
        .await?;

    Ok(Json(MessageResponse::new(
        "Advertisement deleted successfully",
    )))
}
