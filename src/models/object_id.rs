//! Opaque record identifier
//!
//! Every stored record is keyed by a 12-byte identifier whose external form
//! is 24 hex characters. The first four bytes are the big-endian creation
//! time in seconds, the remaining eight are random.

use chrono::Utc;
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const ID_LEN: usize = 12;

/// Record identifier, rendered as 24 lowercase hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ID_LEN]);

/// Failure to parse the external identifier form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectIdError {
    #[error("identifier must be {expected} hex characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("identifier contains non-hex characters")]
    InvalidHex,
}

impl ObjectId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        let mut bytes = [0u8; ID_LEN];
        let secs = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        Self(bytes)
    }

    /// Parse the 24-character hex form (case-insensitive)
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        if s.len() != ID_LEN * 2 {
            return Err(ObjectIdError::InvalidLength {
                expected: ID_LEN * 2,
                actual: s.len(),
            });
        }
        let decoded = HEXLOWER_PERMISSIVE
            .decode(s.as_bytes())
            .map_err(|_| ObjectIdError::InvalidHex)?;
        let mut bytes = [0u8; ID_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        HEXLOWER.encode(&self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_str(&s).map_err(serde::de::Error::custom)
    }
}
