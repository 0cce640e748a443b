//! Booking model
//!
//! A booking ties a user to a restaurant at a point in time. Cancelling
//! flips `cancelled` and keeps the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ObjectId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub restaurant_id: ObjectId,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub cancelled: bool,
}

impl Booking {
    pub fn new(user_id: ObjectId, restaurant_id: ObjectId, date: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            user_id,
            restaurant_id,
            date,
            cancelled: false,
        }
    }

    /// Not cancelled
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }
}

/// Body of `POST /bookings`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub user_id: ObjectId,
    pub restaurant_id: ObjectId,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub cancelled: bool,
}

/// Body of `PUT /bookings/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingInput {
    pub user_id: Option<ObjectId>,
    pub restaurant_id: Option<ObjectId>,
    pub date: Option<DateTime<Utc>>,
    pub cancelled: Option<bool>,
}
