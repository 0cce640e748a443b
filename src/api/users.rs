//! User API endpoints
//!
//! - POST   /users                       - Register (public)
//! - POST   /users/login                 - Login, returns a token pair (public)
//! - GET    /users/{id}                  - Fetch a user
//! - PUT    /users/{id}                  - Update a user
//! - DELETE /users/{id}                  - Delete a user
//! - GET    /users/{id}/bookings         - All of a user's bookings
//! - GET    /users/{id}/future-bookings  - Bookings from now on
//! - GET    /users/{id}/rates            - A user's ratings

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::api::common::parse_object_id;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateUserInput, LoginInput, UpdateUserInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/login", post(login))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/bookings", get(list_bookings))
        .route("/users/{id}/future-bookings", get(list_future_bookings))
        .route("/users/{id}/rates", get(list_rates))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let user = state.user_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let tokens = state.user_service.login(input).await?;
    Ok(Json(tokens))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.user_service.get(id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let Json(input) = payload?;
    Ok(Json(state.user_service.update(id, input).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_object_id(&id)?;
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.booking_service.for_user(id).await?))
}

async fn list_future_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.booking_service.future_for_user(id).await?))
}

async fn list_rates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.rate_service.for_user(id).await?))
}
