//! Data models
//!
//! Entities stored in the document store and the request bodies that
//! create or modify them.

mod booking;
mod object_id;
mod rate;
mod restaurant;
mod user;

pub use booking::{Booking, CreateBookingInput, UpdateBookingInput};
pub use object_id::{ObjectId, ObjectIdError};
pub use rate::{AverageRating, CreateRateInput, Rate, UpdateRateInput};
pub use restaurant::{CreateRestaurantInput, LoginInput, Restaurant, UpdateRestaurantInput};
pub use user::{CreateUserInput, UpdateUserInput, User};
