//! Common API utilities and shared types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::ApiError;
use crate::models::ObjectId;

/// Parse a path identifier. Garbage is a client error, never a 404.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|e| ApiError::bad_request(format!("Invalid id '{}': {}", raw, e)))
}

/// Parse an RFC 3339 timestamp from the path.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ApiError::bad_request(format!("Invalid date '{}': {}", raw, e)))
}

/// `?limit=` on the recent-ratings endpoint, kept raw so that bad values
/// fall back to the default instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

/// Body of `POST /refresh-token`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}
