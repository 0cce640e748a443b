//! Restaurant service

use std::sync::Arc;

use crate::db::repositories::RestaurantRepository;
use crate::models::{
    CreateRestaurantInput, LoginInput, ObjectId, Restaurant, UpdateRestaurantInput,
};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::{TokenPair, TokenService};
use crate::services::user::invalid_credentials;

pub struct RestaurantService {
    restaurants: Arc<dyn RestaurantRepository>,
    tokens: Arc<TokenService>,
}

impl RestaurantService {
    pub fn new(restaurants: Arc<dyn RestaurantRepository>, tokens: Arc<TokenService>) -> Self {
        Self {
            restaurants,
            tokens,
        }
    }

    pub async fn create(&self, input: CreateRestaurantInput) -> ServiceResult<Restaurant> {
        if input.phone.trim().is_empty() {
            return Err(ServiceError::Validation("phone is required".to_string()));
        }
        if input.password.is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }

        let restaurant = Restaurant::new(
            input.name,
            input.address,
            input.phone,
            hash_password(&input.password)?,
        );

        let restaurant = self.restaurants.create(&restaurant).await?;
        tracing::info!(restaurant_id = %restaurant.id, "restaurant created");
        Ok(restaurant)
    }

    pub async fn login(&self, input: LoginInput) -> ServiceResult<TokenPair> {
        let restaurant = self
            .restaurants
            .get_by_phone(&input.phone)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&input.password, &restaurant.password_hash)? {
            tracing::debug!(restaurant_id = %restaurant.id, "restaurant login rejected");
            return Err(invalid_credentials());
        }

        tracing::info!(restaurant_id = %restaurant.id, "restaurant logged in");
        Ok(self.tokens.issue_pair(restaurant.id)?)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Restaurant>> {
        Ok(self.restaurants.list().await?)
    }

    pub async fn get(&self, id: ObjectId) -> ServiceResult<Restaurant> {
        self.restaurants
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Restaurant"))
    }

    pub async fn update(
        &self,
        id: ObjectId,
        input: UpdateRestaurantInput,
    ) -> ServiceResult<Restaurant> {
        let mut restaurant = self.get(id).await?;

        if let Some(name) = input.name {
            restaurant.name = name;
        }
        if let Some(address) = input.address {
            restaurant.address = address;
        }
        if let Some(phone) = input.phone {
            restaurant.phone = phone;
        }
        if let Some(password) = input.password.filter(|p| !p.is_empty()) {
            restaurant.password_hash = hash_password(&password)?;
        }

        if !self.restaurants.update(&restaurant).await? {
            return Err(ServiceError::NotFound("Restaurant"));
        }
        tracing::info!(restaurant_id = %id, "restaurant updated");
        Ok(restaurant)
    }

    pub async fn delete(&self, id: ObjectId) -> ServiceResult<()> {
        if !self.restaurants.delete(id).await? {
            return Err(ServiceError::NotFound("Restaurant"));
        }
        tracing::info!(restaurant_id = %id, "restaurant deleted");
        Ok(())
    }
}
