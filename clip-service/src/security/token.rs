//! Session token issue/verify.
//!
//! Tokens are stateless HS256 JWTs: verification is a pure function of the
//! token and the signing secret, so any process configured with the same
//! secret can verify interchangeably. The secret is injected from [`crate::config::AuthConfig`]
//! at startup; there is no global key state and no built-in default.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, Result};

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id as UUID string)
    pub sub: String,
    /// Username at issue time
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signing/verification keys plus token lifetime, built once from config
/// and shared by the login handler and the auth middleware.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
            ttl: Duration::seconds(auth.token_ttl_secs),
        }
    }

    /// Issue a signed token for the given user
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Expiry is checked with zero leeway; an expired token fails regardless
    /// of signature validity.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            })
    }
}
