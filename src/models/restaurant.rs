//! Restaurant model

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// Restaurant account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: ObjectId,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl Restaurant {
    pub fn new(name: String, address: String, phone: String, password_hash: String) -> Self {
        Self {
            id: ObjectId::new(),
            name,
            address,
            phone,
            password_hash,
        }
    }
}

/// Body of `POST /restaurants`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRestaurantInput {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub password: String,
}

/// Body of `PUT /restaurants/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRestaurantInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Credentials accepted by both login endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub phone: String,
    pub password: String,
}
