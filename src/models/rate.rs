//! Rate model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ObjectId;

/// A user's rating of a restaurant. `date` is stamped by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub restaurant_id: ObjectId,
    pub rating: u8,
    pub comment: String,
    pub date: DateTime<Utc>,
}

impl Rate {
    pub fn new(
        user_id: ObjectId,
        restaurant_id: ObjectId,
        rating: u8,
        comment: String,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            user_id,
            restaurant_id,
            rating,
            comment,
            date,
        }
    }
}

/// Body of `POST /rates`. Any `date` sent by the client is discarded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRateInput {
    pub user_id: ObjectId,
    pub restaurant_id: ObjectId,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Body of `PUT /rates/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRateInput {
    pub user_id: Option<ObjectId>,
    pub restaurant_id: Option<ObjectId>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

/// Result of the average-rating aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageRating {
    pub restaurant_id: ObjectId,
    pub average_rating: f64,
}
