//! Token refresh endpoint
//!
//! POST /refresh-token with `{"refreshToken": "..."}` returns a new access
//! token. Any rejected token gets the same 401 as the gate.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::api::common::{AccessTokenResponse, RefreshTokenRequest};
use crate::api::middleware::{ApiError, AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/refresh-token", post(refresh_token))
}

async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let access_token = state.tokens.refresh(&request.refresh_token).map_err(|e| {
        tracing::debug!(reason = %e, "refresh rejected");
        ApiError::unauthorized()
    })?;

    Ok(Json(AccessTokenResponse { access_token }))
}
