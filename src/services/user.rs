//! User service
//!
//! Registration, login and profile maintenance for diners.

use std::sync::Arc;

use crate::db::repositories::UserRepository;
use crate::models::{CreateUserInput, LoginInput, ObjectId, UpdateUserInput, User};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::{TokenPair, TokenService};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Register a new user. The password is stored only as a hash.
    pub async fn create(&self, input: CreateUserInput) -> ServiceResult<User> {
        if input.phone_number.trim().is_empty() {
            return Err(ServiceError::Validation("phoneNumber is required".to_string()));
        }
        if input.password.is_empty() {
            return Err(ServiceError::Validation("password is required".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let user = User::new(
            input.first_name,
            input.last_name,
            input.phone_number,
            password_hash,
        );

        let user = self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Check credentials and hand out a token pair.
    pub async fn login(&self, input: LoginInput) -> ServiceResult<TokenPair> {
        let user = self
            .users
            .get_by_phone(&input.phone)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "user login rejected");
            return Err(invalid_credentials());
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(self.tokens.issue_pair(user.id)?)
    }

    pub async fn get(&self, id: ObjectId) -> ServiceResult<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }

    /// Apply the provided fields. An empty password leaves the hash alone.
    pub async fn update(&self, id: ObjectId, input: UpdateUserInput) -> ServiceResult<User> {
        let mut user = self.get(id).await?;

        if let Some(first_name) = input.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = last_name;
        }
        if let Some(phone_number) = input.phone_number {
            user.phone_number = phone_number;
        }
        if let Some(password) = input.password.filter(|p| !p.is_empty()) {
            user.password_hash = hash_password(&password)?;
        }

        if !self.users.update(&user).await? {
            return Err(ServiceError::NotFound("User"));
        }
        tracing::info!(user_id = %id, "user updated");
        Ok(user)
    }

    pub async fn delete(&self, id: ObjectId) -> ServiceResult<()> {
        if !self.users.delete(id).await? {
            return Err(ServiceError::NotFound("User"));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}

pub(crate) fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid credentials".to_string())
}
