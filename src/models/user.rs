//! User model
//!
//! Diner accounts. The password is write-only: inputs carry plaintext,
//! the entity carries only the Argon2id hash and never serializes it.

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: ObjectId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    /// Password hash (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl User {
    /// Create a new user with a fresh identifier.
    ///
    /// The password must already be hashed.
    pub fn new(
        first_name: String,
        last_name: String,
        phone_number: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: ObjectId::new(),
            first_name,
            last_name,
            phone_number,
            password_hash,
        }
    }
}

/// Body of `POST /users`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    /// Plaintext password (will be hashed)
    pub password: String,
}

/// Body of `PUT /users/{id}`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    /// New plaintext password; empty means unchanged
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "+15550001".to_string(),
            "$argon2id$secret".to_string(),
        );
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["phoneNumber"], "+15550001");
        assert_eq!(json["id"], user.id.to_hex());
    }

    #[test]
    fn test_update_input_fields_optional() {
        let input: UpdateUserInput = serde_json::from_str(r#"{"lastName":"Byron"}"#).unwrap();
        assert_eq!(input.last_name.as_deref(), Some("Byron"));
        assert!(input.password.is_none());
        assert!(input.first_name.is_none());
    }
}
