//! Session tokens
//!
//! Stateless HS256 JWTs. A token carries its subject id, an expiry in unix
//! seconds and its kind. Access tokens open protected routes; refresh tokens
//! can only be exchanged for a new access token. Nothing is persisted, so a
//! token dies only by expiring.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::AuthConfig;
use crate::models::ObjectId;

pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Signed payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject id, hex
    pub sub: String,
    /// Expiry, unix seconds
    pub exp: i64,
    pub kind: TokenKind,
}

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },
}

impl From<jwt::Error> for AuthError {
    fn from(err: jwt::Error) -> Self {
        match err {
            jwt::Error::InvalidSignature
            | jwt::Error::AlgorithmMismatch(..)
            | jwt::Error::RustCryptoMac(_) => AuthError::InvalidSignature,
            _ => AuthError::Malformed,
        }
    }
}

fn ttl_from_secs(secs: i64) -> anyhow::Result<Duration> {
    Duration::try_seconds(secs)
        .ok_or_else(|| anyhow::anyhow!("Token lifetime out of range: {}s", secs))
}

/// Token pair handed out on login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and checks tokens with one immutable secret.
#[derive(Clone)]
pub struct TokenService {
    key: Hmac<Sha256>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Service with the default lifetimes (1 h access, 24 h refresh).
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        let key = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid token secret: {}", e))?;

        Ok(Self {
            key,
            access_ttl: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        })
    }

    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        Ok(Self::new(&config.jwt_secret)?.with_ttls(
            ttl_from_secs(config.access_token_ttl_secs)?,
            ttl_from_secs(config.refresh_token_ttl_secs)?,
        ))
    }

    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    pub fn issue(&self, subject: ObjectId, kind: TokenKind) -> anyhow::Result<String> {
        self.issue_at(subject, kind, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: ObjectId,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> anyhow::Result<String> {
        let expires_at = now
            .checked_add_signed(self.ttl(kind))
            .ok_or_else(|| anyhow::anyhow!("Token expiry out of range"))?;
        let claims = Claims {
            sub: subject.to_hex(),
            exp: expires_at.timestamp(),
            kind,
        };

        claims
            .sign_with_key(&self.key)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
    }

    /// Access and refresh token for one subject
    pub fn issue_pair(&self, subject: ObjectId) -> anyhow::Result<TokenPair> {
        let now = Utc::now();
        Ok(TokenPair {
            access_token: self.issue_at(subject, TokenKind::Access, now)?,
            refresh_token: self.issue_at(subject, TokenKind::Refresh, now)?,
        })
    }

    /// Check an access token and return its subject.
    pub fn validate(&self, token: &str) -> Result<ObjectId, AuthError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<ObjectId, AuthError> {
        let claims = self.verify_at(token, TokenKind::Access, now)?;
        ObjectId::parse_str(&claims.sub).map_err(|_| AuthError::Malformed)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is neither extended nor reissued.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        self.refresh_at(refresh_token, Utc::now())
    }

    pub fn refresh_at(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.verify_at(refresh_token, TokenKind::Refresh, now)?;
        let subject = ObjectId::parse_str(&claims.sub).map_err(|_| AuthError::Malformed)?;

        self.issue_at(subject, TokenKind::Access, now).map_err(|e| {
            tracing::error!("Failed to issue access token: {:#}", e);
            AuthError::Malformed
        })
    }

    /// Signature, expiry and kind, in that order.
    fn verify_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        let claims: Claims = token.verify_with_key(&self.key)?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::Expired);
        }
        if claims.kind != expected {
            return Err(AuthError::WrongKind { expected });
        }
        Ok(claims)
    }
}
