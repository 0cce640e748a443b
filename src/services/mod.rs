//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories. They own
//! password hashing, token issuance and the not-found checks, and report
//! failures as [`ServiceError`].

pub mod booking;
pub mod error;
pub mod password;
pub mod rate;
pub mod restaurant;
pub mod token;
pub mod user;

pub use booking::BookingService;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use password::{hash_password, verify_password};
pub use rate::RateService;
pub use restaurant::RestaurantService;
pub use token::{AuthError, Claims, TokenKind, TokenPair, TokenService};
pub use user::UserService;
