//! Rate API endpoints
//!
//! All rate routes are protected, creation included.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::api::common::{parse_object_id, LimitQuery};
use crate::api::middleware::{ApiError, AppState, AuthSubject};
use crate::models::{CreateRateInput, UpdateRateInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rates", post(create_rate))
        .route("/rates/recent", get(recent_rates))
        .route(
            "/rates/{id}",
            get(get_rate).put(update_rate).delete(delete_rate),
        )
}

async fn create_rate(
    State(state): State<AppState>,
    AuthSubject(subject): AuthSubject,
    payload: Result<Json<CreateRateInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    tracing::debug!(subject = %subject, "creating rate");
    let rate = state.rate_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

async fn recent_rates(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.rate_service.recent(query.limit.as_deref()).await?))
}

async fn get_rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.rate_service.get(id).await?))
}

async fn update_rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRateInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_object_id(&id)?;
    let Json(input) = payload?;
    Ok(Json(state.rate_service.update(id, input).await?))
}

async fn delete_rate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_object_id(&id)?;
    state.rate_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
