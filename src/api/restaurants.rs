//! Restaurant API endpoints
//!
//! Account management for restaurants plus the per-restaurant booking and
//! rating views.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::api::common::parse_object_id;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateRestaurantInput, LoginInput, UpdateRestaurantInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", post(create_restaurant).get(list_restaurants))
        .route("/restaurants/login", post(login))
        .route(
            "/restaurants/{id}",
            get(get_restaurant)
                .put(update_restaurant)
                .delete(delete_restaurant),
        )
        .route("/restaurants/{id}/bookings", get(list_bookings))
        .route("/restaurants/{id}/active-bookings", get(list_active_bookings))
        .route("/restaurants/{id}/past-bookings", get(list_past_bookings))
        .route("/restaurants/{id}/rates", get(list_rates))
        .route("/restaurants/{id}/average-rating", get(average_rating))
}

async fn create_restaurant(
    State(state): State<AppState>,
    payload: Result<Json<CreateRestaurantInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let restaurant = state.restaurant_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    Ok(Json(state.restaurant_service.login(input).await?))
}

async fn list_restaurants(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.restaurant_service.list().await?))
}

async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.restaurant_service.get(id).await?))
}

async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRestaurantInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let Json(input) = payload?;
    Ok(Json(state.restaurant_service.update(id, input).await?))
}

async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_object_id(&id)?;
    state.restaurant_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.booking_service.for_restaurant(id).await?))
}

async fn list_active_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.booking_service.active_for_restaurant(id).await?))
}

async fn list_past_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.booking_service.past_for_restaurant(id).await?))
}

async fn list_rates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.rate_service.for_restaurant(id).await?))
}

async fn average_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.rate_service.average(id).await?))
}
