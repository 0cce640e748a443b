//! Booking API endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use crate::api::common::{parse_date, parse_object_id};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateBookingInput, UpdateBookingInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/date/{date}", get(list_on_date))
        .route(
            "/bookings/{id}",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/bookings/{id}/cancel", put(cancel_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let booking = state.booking_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.booking_service.get(id).await?))
}

async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBookingInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let Json(input) = payload?;
    Ok(Json(state.booking_service.update(id, input).await?))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_object_id(&id)?;
    state.booking_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_object_id(&id)?;
    state.booking_service.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_on_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let date = parse_date(&date)?;
    Ok(Json(state.booking_service.on_day(date).await?))
}
