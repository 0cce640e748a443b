//! Rate service
//!
//! Ratings are stamped with the server clock on creation and keep that
//! date through every update.

use chrono::Utc;
use std::sync::Arc;

use crate::db::query::{recent_limit, RateFilter};
use crate::db::repositories::RateRepository;
use crate::models::{AverageRating, CreateRateInput, ObjectId, Rate, UpdateRateInput};
use crate::services::error::{ServiceError, ServiceResult};

pub struct RateService {
    rates: Arc<dyn RateRepository>,
}

impl RateService {
    pub fn new(rates: Arc<dyn RateRepository>) -> Self {
        Self { rates }
    }

    pub async fn create(&self, input: CreateRateInput) -> ServiceResult<Rate> {
        let rate = Rate::new(
            input.user_id,
            input.restaurant_id,
            input.rating,
            input.comment,
            Utc::now(),
        );

        let rate = self.rates.create(&rate).await?;
        tracing::info!(
            rate_id = %rate.id,
            restaurant_id = %rate.restaurant_id,
            rating = rate.rating,
            "rate created"
        );
        Ok(rate)
    }

    pub async fn get(&self, id: ObjectId) -> ServiceResult<Rate> {
        self.rates
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Rate"))
    }

    pub async fn update(&self, id: ObjectId, input: UpdateRateInput) -> ServiceResult<Rate> {
        let mut rate = self.get(id).await?;

        if let Some(user_id) = input.user_id {
            rate.user_id = user_id;
        }
        if let Some(restaurant_id) = input.restaurant_id {
            rate.restaurant_id = restaurant_id;
        }
        if let Some(rating) = input.rating {
            rate.rating = rating;
        }
        if let Some(comment) = input.comment {
            rate.comment = comment;
        }

        if !self.rates.update(&rate).await? {
            return Err(ServiceError::NotFound("Rate"));
        }
        tracing::info!(rate_id = %id, "rate updated");
        Ok(rate)
    }

    pub async fn delete(&self, id: ObjectId) -> ServiceResult<()> {
        if !self.rates.delete(id).await? {
            return Err(ServiceError::NotFound("Rate"));
        }
        tracing::info!(rate_id = %id, "rate deleted");
        Ok(())
    }

    pub async fn for_restaurant(&self, restaurant_id: ObjectId) -> ServiceResult<Vec<Rate>> {
        Ok(self
            .rates
            .list(&RateFilter::for_restaurant(restaurant_id))
            .await?)
    }

    pub async fn for_user(&self, user_id: ObjectId) -> ServiceResult<Vec<Rate>> {
        Ok(self.rates.list(&RateFilter::for_user(user_id)).await?)
    }

    /// Mean rating, `0` for a restaurant nobody has rated
    pub async fn average(&self, restaurant_id: ObjectId) -> ServiceResult<AverageRating> {
        let average_rating = self
            .rates
            .average(&RateFilter::for_restaurant(restaurant_id))
            .await?;

        Ok(AverageRating {
            restaurant_id,
            average_rating,
        })
    }

    /// Newest rates first. `limit` is the raw query parameter.
    pub async fn recent(&self, limit: Option<&str>) -> ServiceResult<Vec<Rate>> {
        Ok(self.rates.recent(recent_limit(limit)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxRateRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> RateService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        RateService::new(SqlxRateRepository::boxed(pool))
    }

    fn input(restaurant: ObjectId, rating: u8) -> CreateRateInput {
        CreateRateInput {
            user_id: ObjectId::new(),
            restaurant_id: restaurant,
            rating,
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn test_average_of_nothing_is_zero() {
        let service = setup().await;
        let restaurant = ObjectId::new();

        let average = service.average(restaurant).await.unwrap();
        assert_eq!(average.restaurant_id, restaurant);
        assert_eq!(average.average_rating, 0.0);
    }

    #[tokio::test]
    async fn test_average_of_three_and_five_is_four() {
        let service = setup().await;
        let restaurant = ObjectId::new();
        service.create(input(restaurant, 3)).await.unwrap();
        service.create(input(restaurant, 5)).await.unwrap();

        assert_eq!(service.average(restaurant).await.unwrap().average_rating, 4.0);
    }

    #[tokio::test]
    async fn test_create_stamps_date() {
        let service = setup().await;
        let before = Utc::now();
        let rate = service.create(input(ObjectId::new(), 4)).await.unwrap();

        assert!(rate.date >= before);
        assert!(rate.date <= Utc::now());
    }

    #[tokio::test]
    async fn test_update_preserves_date() {
        let service = setup().await;
        let rate = service.create(input(ObjectId::new(), 1)).await.unwrap();

        let updated = service
            .update(
                rate.id,
                UpdateRateInput {
                    rating: Some(5),
                    comment: Some("much better".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.date, rate.date);
        assert_eq!(updated.rating, 5);
        assert_eq!(service.get(rate.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_recent_limits() {
        let service = setup().await;
        for _ in 0..12 {
            service.create(input(ObjectId::new(), 3)).await.unwrap();
        }

        assert_eq!(service.recent(None).await.unwrap().len(), 10);
        assert_eq!(service.recent(Some("2")).await.unwrap().len(), 2);
        assert_eq!(service.recent(Some("junk")).await.unwrap().len(), 10);
        assert_eq!(service.recent(Some("-1")).await.unwrap().len(), 10);
    }
}
