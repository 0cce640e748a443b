//! Booking service
//!
//! Each list operation builds a [`BookingFilter`] and hands it to the
//! repository. Time-relative queries read the clock when they run.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::query::BookingFilter;
use crate::db::repositories::BookingRepository;
use crate::models::{Booking, CreateBookingInput, ObjectId, UpdateBookingInput};
use crate::services::error::{ServiceError, ServiceResult};

pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn create(&self, input: CreateBookingInput) -> ServiceResult<Booking> {
        let mut booking = Booking::new(input.user_id, input.restaurant_id, input.date);
        booking.cancelled = input.cancelled;

        let booking = self.bookings.create(&booking).await?;
        tracing::info!(
            booking_id = %booking.id,
            restaurant_id = %booking.restaurant_id,
            "booking created"
        );
        Ok(booking)
    }

    pub async fn get(&self, id: ObjectId) -> ServiceResult<Booking> {
        self.bookings
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Booking"))
    }

    pub async fn update(&self, id: ObjectId, input: UpdateBookingInput) -> ServiceResult<Booking> {
        let mut booking = self.get(id).await?;

        if let Some(user_id) = input.user_id {
            booking.user_id = user_id;
        }
        if let Some(restaurant_id) = input.restaurant_id {
            booking.restaurant_id = restaurant_id;
        }
        if let Some(date) = input.date {
            booking.date = date;
        }
        if let Some(cancelled) = input.cancelled {
            booking.cancelled = cancelled;
        }

        if !self.bookings.update(&booking).await? {
            return Err(ServiceError::NotFound("Booking"));
        }
        tracing::info!(booking_id = %id, "booking updated");
        Ok(booking)
    }

    /// Soft delete. Cancelling an already cancelled booking succeeds.
    pub async fn cancel(&self, id: ObjectId) -> ServiceResult<()> {
        if !self.bookings.cancel(id).await? {
            return Err(ServiceError::NotFound("Booking"));
        }
        tracing::info!(booking_id = %id, "booking cancelled");
        Ok(())
    }

    pub async fn delete(&self, id: ObjectId) -> ServiceResult<()> {
        if !self.bookings.delete(id).await? {
            return Err(ServiceError::NotFound("Booking"));
        }
        tracing::info!(booking_id = %id, "booking deleted");
        Ok(())
    }

    pub async fn for_restaurant(&self, restaurant_id: ObjectId) -> ServiceResult<Vec<Booking>> {
        self.list(BookingFilter::for_restaurant(restaurant_id)).await
    }

    pub async fn active_for_restaurant(
        &self,
        restaurant_id: ObjectId,
    ) -> ServiceResult<Vec<Booking>> {
        self.list(BookingFilter::for_restaurant(restaurant_id).active())
            .await
    }

    pub async fn past_for_restaurant(
        &self,
        restaurant_id: ObjectId,
    ) -> ServiceResult<Vec<Booking>> {
        self.list(BookingFilter::for_restaurant(restaurant_id).past(Utc::now()))
            .await
    }

    pub async fn for_user(&self, user_id: ObjectId) -> ServiceResult<Vec<Booking>> {
        self.list(BookingFilter::for_user(user_id)).await
    }

    pub async fn future_for_user(&self, user_id: ObjectId) -> ServiceResult<Vec<Booking>> {
        self.list(BookingFilter::for_user(user_id).upcoming(Utc::now()))
            .await
    }

    /// Bookings in the 24 hours starting at `date`
    pub async fn on_day(&self, date: DateTime<Utc>) -> ServiceResult<Vec<Booking>> {
        self.list(BookingFilter::on_day(date)).await
    }

    async fn list(&self, filter: BookingFilter) -> ServiceResult<Vec<Booking>> {
        Ok(self.bookings.list(&filter).await?)
    }
}
