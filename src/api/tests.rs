//! HTTP tests for the assembled router

use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::{build_router, Access, AppState, ROUTE_TABLE};
use crate::db::{create_test_pool, migrations};
use crate::models::ObjectId;
use crate::services::TokenService;

async fn server() -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let tokens = TokenService::new("test-secret").unwrap();
    let app = build_router(
        AppState::new(pool, tokens),
        HeaderValue::from_static("http://localhost:3000"),
    );
    TestServer::new(app).unwrap()
}

struct Session {
    id: String,
    access_token: String,
    refresh_token: String,
}

async fn register_user(server: &TestServer, phone: &str) -> Session {
    let response = server
        .post("/users")
        .json(&json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "phoneNumber": phone,
            "password": "secret",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let id = response.json::<Value>()["id"].as_str().unwrap().to_string();

    let response = server
        .post("/users/login")
        .json(&json!({"phone": phone, "password": "secret"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();

    Session {
        id,
        access_token: body["accessToken"].as_str().unwrap().to_string(),
        refresh_token: body["refreshToken"].as_str().unwrap().to_string(),
    }
}

async fn create_rate(server: &TestServer, token: &str, restaurant: &str, rating: u8) -> Value {
    let response = server
        .post("/rates")
        .authorization_bearer(token)
        .json(&json!({
            "userId": ObjectId::new().to_hex(),
            "restaurantId": restaurant,
            "rating": rating,
            "comment": "fine",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()
}

async fn create_booking(server: &TestServer, restaurant: &str, date: &str) -> Value {
    let response = server
        .post("/bookings")
        .json(&json!({
            "userId": ObjectId::new().to_hex(),
            "restaurantId": restaurant,
            "date": date,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_protected_route_without_token() {
    let server = server().await;
    let response = server.get("/restaurants").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.json::<Value>(),
        json!({"error": {"code": "UNAUTHORIZED", "message": "Unauthorized"}})
    );
}

#[tokio::test]
async fn test_register_login_and_fetch_user() {
    let server = server().await;
    let session = register_user(&server, "+15550100").await;

    let response = server
        .get(&format!("/users/{}", session.id))
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["phoneNumber"], "+15550100");
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_token_without_bearer_prefix_is_accepted() {
    let server = server().await;
    let session = register_user(&server, "+15550101").await;

    let response = server
        .get(&format!("/users/{}", session.id))
        .authorization(session.access_token.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_bad_tokens_get_uniform_401() {
    let server = server().await;
    let session = register_user(&server, "+15550102").await;
    let other_secret = TokenService::new("other-secret")
        .unwrap()
        .issue(ObjectId::new(), crate::services::TokenKind::Access)
        .unwrap();

    for token in ["garbage", other_secret.as_str(), session.refresh_token.as_str()] {
        let response = server
            .get("/restaurants")
            .authorization_bearer(token)
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"]["message"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_wrong_password_is_401() {
    let server = server().await;
    register_user(&server, "+15550103").await;

    let response = server
        .post("/users/login")
        .json(&json!({"phone": "+15550103", "password": "nope"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_endpoint() {
    let server = server().await;
    let session = register_user(&server, "+15550104").await;

    let response = server
        .post("/refresh-token")
        .json(&json!({"refreshToken": session.refresh_token}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let access = response.json::<Value>()["accessToken"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .get(&format!("/users/{}", session.id))
        .authorization_bearer(&access)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post("/refresh-token")
        .json(&json!({"refreshToken": session.access_token}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_restaurant_login_returns_pair() {
    let server = server().await;
    let response = server
        .post("/restaurants")
        .json(&json!({
            "name": "Chez Panisse",
            "address": "1517 Shattuck Ave",
            "phone": "+15105485525",
            "password": "kitchen",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server
        .post("/restaurants/login")
        .json(&json!({"phone": "+15105485525", "password": "kitchen"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert!(body["accessToken"].is_string());
    assert!(body["refreshToken"].is_string());
}

// ============================================================================
// Identifiers and bodies
// ============================================================================

#[tokio::test]
async fn test_garbage_id_is_400_unknown_id_is_404() {
    let server = server().await;
    let session = register_user(&server, "+15550105").await;

    let response = server
        .get("/bookings/not-an-id")
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let unknown = ObjectId::new().to_hex();
    for path in [
        format!("/bookings/{}", unknown),
        format!("/users/{}", unknown),
        format!("/restaurants/{}", unknown),
        format!("/rates/{}", unknown),
    ] {
        let response = server
            .get(&path)
            .authorization_bearer(&session.access_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{}", path);
    }

    let response = server
        .delete(&format!("/rates/{}", unknown))
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let server = server().await;

    let response = server
        .post("/bookings")
        .json(&json!({"userId": "xyz", "restaurantId": 7}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "BAD_REQUEST");

    let response = server.post("/users").text("{not json").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Bookings
// ============================================================================

#[tokio::test]
async fn test_cancel_is_idempotent() {
    let server = server().await;
    let session = register_user(&server, "+15550106").await;
    let restaurant = ObjectId::new().to_hex();
    let booking = create_booking(&server, &restaurant, "2030-05-01T19:00:00Z").await;
    let id = booking["id"].as_str().unwrap();
    assert_eq!(booking["cancelled"], false);

    for _ in 0..2 {
        let response = server
            .put(&format!("/bookings/{}/cancel", id))
            .authorization_bearer(&session.access_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    }

    let response = server
        .get(&format!("/bookings/{}", id))
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.json::<Value>()["cancelled"], true);

    let response = server
        .get(&format!("/restaurants/{}/active-bookings", restaurant))
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.json::<Value>(), json!([]));

    let response = server
        .put(&format!("/bookings/{}/cancel", ObjectId::new()))
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bookings_on_date() {
    let server = server().await;
    let session = register_user(&server, "+15550107").await;
    let restaurant = ObjectId::new().to_hex();

    let inside = create_booking(&server, &restaurant, "2024-01-01T23:59:59Z").await;
    create_booking(&server, &restaurant, "2024-01-02T00:00:00Z").await;
    create_booking(&server, &restaurant, "2023-12-31T23:59:59Z").await;

    let response = server
        .get("/bookings/date/2024-01-01T00:00:00Z")
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], inside["id"]);

    let response = server
        .get("/bookings/date/yesterday")
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bookings_with_offsets_are_stored_in_utc() {
    let server = server().await;
    let session = register_user(&server, "+15550112").await;
    let restaurant = ObjectId::new().to_hex();

    // 2024-01-01T23:30:00Z and 2023-12-31T23:00:00Z
    let inside = create_booking(&server, &restaurant, "2024-01-02T01:30:00+02:00").await;
    create_booking(&server, &restaurant, "2024-01-01T01:00:00+02:00").await;

    let response = server
        .get("/bookings/date/2024-01-01T00:00:00Z")
        .authorization_bearer(&session.access_token)
        .await;

    let body = response.json::<Value>();
    let found = body.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], inside["id"]);

    let stored: DateTime<Utc> = found[0]["date"].as_str().unwrap().parse().unwrap();
    assert_eq!(stored, "2024-01-01T23:30:00Z".parse::<DateTime<Utc>>().unwrap());
}

#[tokio::test]
async fn test_past_and_future_bookings() {
    let server = server().await;
    let session = register_user(&server, "+15550108").await;
    let restaurant = ObjectId::new().to_hex();

    let response = server
        .post("/bookings")
        .json(&json!({
            "userId": session.id,
            "restaurantId": restaurant,
            "date": "2099-01-01T20:00:00Z",
        }))
        .await;
    let future = response.json::<Value>();
    create_booking(&server, &restaurant, "2001-01-01T20:00:00Z").await;

    let response = server
        .get(&format!("/users/{}/future-bookings", session.id))
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.json::<Value>(), json!([future]));

    let response = server
        .get(&format!("/restaurants/{}/past-bookings", restaurant))
        .authorization_bearer(&session.access_token)
        .await;
    let past = response.json::<Value>();
    assert_eq!(past.as_array().unwrap().len(), 1);
    assert_eq!(past[0]["date"], "2001-01-01T20:00:00Z");
}

// ============================================================================
// Rates
// ============================================================================

#[tokio::test]
async fn test_average_rating() {
    let server = server().await;
    let session = register_user(&server, "+15550109").await;
    let restaurant = ObjectId::new().to_hex();
    let path = format!("/restaurants/{}/average-rating", restaurant);

    let response = server
        .get(&path)
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(
        response.json::<Value>(),
        json!({"restaurantId": restaurant, "averageRating": 0.0})
    );

    create_rate(&server, &session.access_token, &restaurant, 3).await;
    create_rate(&server, &session.access_token, &restaurant, 5).await;

    let response = server
        .get(&path)
        .authorization_bearer(&session.access_token)
        .await;
    assert_eq!(response.json::<Value>()["averageRating"], 4.0);
}

#[tokio::test]
async fn test_recent_rates_limit() {
    let server = server().await;
    let session = register_user(&server, "+15550110").await;
    let restaurant = ObjectId::new().to_hex();
    for rating in 0..12u8 {
        create_rate(&server, &session.access_token, &restaurant, rating).await;
    }

    for (query, expected) in [("", 10), ("?limit=2", 2), ("?limit=abc", 10), ("?limit=0", 10)] {
        let response = server
            .get(&format!("/rates/recent{}", query))
            .authorization_bearer(&session.access_token)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.json::<Value>();
        let rates = body.as_array().unwrap();
        assert_eq!(rates.len(), expected, "query {:?}", query);

        let dates: Vec<DateTime<Utc>> = rates
            .iter()
            .map(|r| r["date"].as_str().unwrap().parse().unwrap())
            .collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[tokio::test]
async fn test_rate_date_is_server_side() {
    let server = server().await;
    let session = register_user(&server, "+15550111").await;

    let response = server
        .post("/rates")
        .authorization_bearer(&session.access_token)
        .json(&json!({
            "userId": session.id,
            "restaurantId": ObjectId::new().to_hex(),
            "rating": 4,
            "comment": "ok",
            "date": "1999-01-01T00:00:00Z",
        }))
        .await;
    let rate = response.json::<Value>();
    assert_ne!(rate["date"], "1999-01-01T00:00:00Z");

    let response = server
        .put(&format!("/rates/{}", rate["id"].as_str().unwrap()))
        .authorization_bearer(&session.access_token)
        .json(&json!({"rating": 2}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let updated = response.json::<Value>();
    assert_eq!(updated["rating"], 2);
    assert_eq!(updated["date"], rate["date"]);
}

// ============================================================================
// Route table
// ============================================================================

#[tokio::test]
async fn test_route_table_matches_router() {
    let server = server().await;
    let id = ObjectId::new().to_hex();

    for rule in ROUTE_TABLE {
        let path = rule
            .path
            .replace("{id}", &id)
            .replace("{date}", "2024-01-01T00:00:00Z");
        let response = server.method(rule.method.clone(), &path).await;
        let status = response.status_code();

        match rule.access {
            Access::Protected => {
                assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", rule.method, rule.path)
            }
            Access::Public => {
                assert_ne!(status, StatusCode::UNAUTHORIZED, "{} {}", rule.method, rule.path);
                assert_ne!(status, StatusCode::NOT_FOUND, "{} {}", rule.method, rule.path);
                assert_ne!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", rule.method, rule.path);
            }
        }
    }
}
