use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    application::usecases::{error::UseCaseError, places::PlaceUseCase},
    domain::{
        repositories::{places::PlaceRepository, subscriptions::SubscriptionRepository},
        value_objects::places::{
            CreatePlaceModel, ListPlacesQuery, PlaceMessageEnvelope, UpdatePlaceModel,
        },
    },
    infrastructure::{
        axum_http::{
            auth::AuthUser,
            error_responses::{MessageResponse, json_rejection, path_rejection, query_rejection},
        },
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{places::PlacePostgres, subscriptions::SubscriptionPostgres},
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let place_repository = PlacePostgres::new(Arc::clone(&db_pool));
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let place_usecase = PlaceUseCase::new(
        Arc::new(place_repository),
        Arc::new(subscription_repository),
    );

    router(Arc::new(place_usecase))
}

pub fn router<P, S>(place_usecase: Arc<PlaceUseCase<P, S>>) -> Router
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list::<P, S>).post(create::<P, S>))
        .route("/pending", get(list_pending::<P, S>))
        .route("/categories", get(categories::<P, S>))
        .route("/my-places", get(list_mine::<P, S>))
        .route(
            "/:id",
            get(get_place::<P, S>)
                .put(update::<P, S>)
                .delete(remove::<P, S>),
        )
        .with_state(place_usecase)
}

pub async fn list<P, S>(
    State(place_usecase): State<Arc<PlaceUseCase<P, S>>>,
    auth_user: Option<AuthUser>,
    query: Result<Query<ListPlacesQuery>, QueryRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Query(query) = query.map_err(query_rejection)?;
    let places = place_usecase
        .list(auth_user.map(|auth_user| auth_user.user_id), query)
        .await?;

    Ok(Json(places))
}

pub async fn list_pending<P, S>(
    State(place_usecase): State<Arc<PlaceUseCase<P, S>>>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let places = place_usecase.list_pending(auth_user.user_id).await?;

    Ok(Json(places))
}

pub async fn categories<P, S>(
    State(place_usecase): State<Arc<PlaceUseCase<P, S>>>,
) -> impl IntoResponse
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    Json(place_usecase.categories())
}

pub async fn list_mine<P, S>(
    State(place_usecase): State<Arc<PlaceUseCase<P, S>>>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let places = place_usecase.list_mine(auth_user.user_id).await?;

    Ok(Json(places))
}

pub async fn get_place<P, S>(
    State(place_usecase): State<Arc<PlaceUseCase<P, S>>>,
    place_id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Path(place_id) = place_id.map_err(path_rejection)?;
    let place = place_usecase.get(place_id).await?;

    Ok(Json(place))
}

pub async fn create<P, S>(
    State(place_usecase): State<Arc<PlaceUseCase<P, S>>>,
    auth_user: AuthUser,
    payload: Result<Json<CreatePlaceModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Json(create_place_model) = payload.map_err(json_rejection)?;
    let place = place_usecase
        .create(auth_user.user_id, create_place_model)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceMessageEnvelope {
            message: "Place created successfully".to_string(),
            place,
        }),
    ))
}

pub async fn update<P, S>(
    State(place_usecase): State<Arc<PlaceUseCase<P, S>>>,
    auth_user: AuthUser,
    place_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdatePlaceModel>, JsonRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Path(place_id) = place_id.map_err(path_rejection)?;
    let Json(update_place_model) = payload.map_err(json_rejection)?;
    let place = place_usecase
        .update(auth_user.user_id, place_id, update_place_model)
        .await?;

    Ok(Json(PlaceMessageEnvelope {
        message: "Place updated successfully".to_string(),
        place,
    }))
}

pub async fn remove<P, S>(
    State(place_usecase): State<Arc<PlaceUseCase<P, S>>>,
    auth_user: AuthUser,
    place_id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, UseCaseError>
where
    P: PlaceRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
{
    let Path(place_id) = place_id.map_err(path_rejection)?;
    place_usecase.delete(auth_user.user_id, place_id).await?;

    Ok(Json(MessageResponse::new("Place deleted successfully")))
}
