//! API layer - HTTP handlers and routing
//!
//! Every resource module contributes a router with its full paths. The
//! merged router is wrapped in the authentication gate as a route layer, so
//! the gate sees the matched route pattern and consults the route table.

pub mod bookings;
pub mod common;
pub mod middleware;
pub mod rates;
pub mod restaurants;
pub mod routes;
pub mod tokens;
pub mod users;

#[cfg(test)]
mod tests;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthSubject};
pub use routes::{Access, RouteRule, ROUTE_TABLE};

/// All endpoints behind the authentication gate
pub fn build_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(restaurants::router())
        .merge(bookings::router())
        .merge(rates::router())
        .merge(tokens::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth_gate,
        ))
}

/// Build the complete router with tracing and CORS
pub fn build_router(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    build_api_router(state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
