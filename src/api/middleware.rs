//! API middleware
//!
//! Shared application state, the JSON error type every handler returns, and
//! the authentication gate that guards protected routes.

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, MatchedPath, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::api::routes::requires_auth;
use crate::db::repositories::{
    SqlxBookingRepository, SqlxRateRepository, SqlxRestaurantRepository, SqlxUserRepository,
};
use crate::models::ObjectId;
use crate::services::{
    BookingService, ErrorKind, RateService, RestaurantService, ServiceError, TokenService,
    UserService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub user_service: Arc<UserService>,
    pub restaurant_service: Arc<RestaurantService>,
    pub booking_service: Arc<BookingService>,
    pub rate_service: Arc<RateService>,
}

impl AppState {
    /// Wire repositories and services over one pool.
    pub fn new(pool: SqlitePool, tokens: TokenService) -> Self {
        let tokens = Arc::new(tokens);

        Self {
            user_service: Arc::new(UserService::new(
                SqlxUserRepository::boxed(pool.clone()),
                tokens.clone(),
            )),
            restaurant_service: Arc::new(RestaurantService::new(
                SqlxRestaurantRepository::boxed(pool.clone()),
                tokens.clone(),
            )),
            booking_service: Arc::new(BookingService::new(SqlxBookingRepository::boxed(
                pool.clone(),
            ))),
            rate_service: Arc::new(RateService::new(SqlxRateRepository::boxed(pool))),
            tokens,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    /// The one response every authentication failure gets
    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "Unauthorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "BAD_REQUEST" => StatusCode::BAD_REQUEST,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => ApiError::bad_request(err.to_string()),
            ErrorKind::NotFound => ApiError::not_found(err.to_string()),
            ErrorKind::Unauthorized => {
                tracing::debug!("request unauthorized: {}", err);
                ApiError::unauthorized()
            }
            ErrorKind::Internal => {
                tracing::error!("internal error: {:#}", err);
                ApiError::internal_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Subject id of the validated access token, set by [`auth_gate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSubject(pub ObjectId);

impl<S> FromRequestParts<S> for AuthSubject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSubject>()
            .copied()
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Token from the `Authorization` header. The `Bearer ` prefix is optional.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim_start();
    let token = match value.strip_prefix("Bearer") {
        Some("") => "",
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value.trim(),
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authentication gate
///
/// Runs after routing. Public routes in the route table pass straight
/// through; everything else needs a valid access token.
pub async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());

    let protected = match path.as_deref() {
        Some(path) => requires_auth(request.method(), path),
        None => true,
    };
    if !protected {
        return Ok(next.run(request).await);
    }

    let token = extract_bearer_token(request.headers()).ok_or_else(|| {
        tracing::debug!(path = ?path, "missing bearer token");
        ApiError::unauthorized()
    })?;

    let subject = state.tokens.validate(token).map_err(|e| {
        tracing::debug!(path = ?path, reason = %e, "token rejected");
        ApiError::unauthorized()
    })?;

    request.extensions_mut().insert(AuthSubject(subject));
    Ok(next.run(request).await)
}
