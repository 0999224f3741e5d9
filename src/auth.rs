// ABOUTME: Token issuing, token validation, and password hashing
// ABOUTME: HS256 JWTs carry the user id and a token version that logout invalidates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! # Authentication
//!
//! Tokens are HS256 JWTs. Each carries the user's `token_version`; logging out
//! bumps the stored version so every outstanding token stops validating.
//! Passwords are hashed with bcrypt on the blocking thread pool.

use crate::config::AuthConfig;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Token audience
const TOKEN_AUDIENCE: &str = "foodgram-api";

/// Accepted `Authorization` header schemes
const AUTH_SCHEMES: [&str; 2] = ["Token ", "Bearer "];

/// Why a token was rejected
#[derive(Debug, Clone, Error)]
pub enum JwtValidationError {
    /// Past its `exp` claim
    #[error("Token expired at {}", expired_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Bad signature, audience, or claims
    #[error("Token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Not a JWT at all
    #[error("Token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl From<JwtValidationError> for AppError {
    fn from(err: JwtValidationError) -> Self {
        Self::auth_invalid(err.to_string())
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User email
    pub email: String,
    /// Token version at issue time
    pub ver: i64,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience
    pub aud: String,
}

impl Claims {
    /// Numeric user id from `sub`
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` if `sub` is not a user id
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))
    }
}

/// Issues and validates tokens, hashes and verifies passwords
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Create a manager from a signing secret
    #[must_use]
    pub fn new(secret: &[u8], token_expiry_hours: i64, bcrypt_cost: u32) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_expiry_hours,
            bcrypt_cost,
        }
    }

    /// Create a manager from configuration, generating a secret when none is set
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        config.jwt_secret.as_ref().map_or_else(
            || {
                let mut secret = [0_u8; 64];
                rand::thread_rng().fill_bytes(&mut secret);
                Self::new(&secret, config.jwt_expiry_hours, config.bcrypt_cost)
            },
            |secret| Self::new(secret.as_bytes(), config.jwt_expiry_hours, config.bcrypt_cost),
        )
    }

    /// Issue a token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            ver: user.token_version,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            aud: TOKEN_AUDIENCE.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))
    }

    /// Validate a token's signature, audience, and expiry
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing why the token was rejected
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(token, &e))
    }

    fn convert_jwt_error(token: &str, e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        warn!("Token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired {
                expired_at: Self::expiry_hint(token).unwrap_or_else(Utc::now),
            },
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "signature verification failed".into(),
            },
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                JwtValidationError::TokenMalformed {
                    details: e.to_string(),
                }
            }
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }

    /// Expiry of an already-rejected token, read without verification
    fn expiry_hint(token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
        DateTime::from_timestamp(data.claims.exp, 0)
    }

    /// Hash a password with the configured bcrypt cost
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the blocking task panics
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Check a password against a stored hash
    ///
    /// Malformed hashes count as a mismatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocking task panics
    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
    }
}

/// Extract the credential from an `Authorization` header value
///
/// Accepts `Token <jwt>` and `Bearer <jwt>`. Returns `None` for other schemes.
#[must_use]
pub fn extract_token(header_value: &str) -> Option<&str> {
    AUTH_SCHEMES
        .iter()
        .find_map(|scheme| header_value.strip_prefix(scheme))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 7,
            email: "cook@example.com".into(),
            username: "cook".into(),
            first_name: "Ann".into(),
            last_name: "Cook".into(),
            password_hash: String::new(),
            avatar: None,
            is_staff: false,
            token_version: 3,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip_carries_version() {
        let manager = AuthManager::new(b"test-secret", 24, 4);
        let token = manager.generate_token(&user()).unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.ver, 3);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = AuthManager::new(b"secret-a", 24, 4);
        let verifier = AuthManager::new(b"secret-b", 24, 4);
        let token = issuer.generate_token(&user()).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = AuthManager::new(b"test-secret", -1, 4);
        let token = manager.generate_token(&user()).unwrap();
        assert!(matches!(
            manager.validate_token(&token),
            Err(JwtValidationError::TokenExpired { .. })
        ));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let manager = AuthManager::new(b"test-secret", 24, 4);
        assert!(matches!(
            manager.validate_token("not-a-jwt"),
            Err(JwtValidationError::TokenMalformed { .. })
        ));
    }

    #[test]
    fn test_extract_token_schemes() {
        assert_eq!(extract_token("Token abc"), Some("abc"));
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("Basic abc"), None);
        assert_eq!(extract_token("Token "), None);
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let manager = AuthManager::new(b"test-secret", 24, 4);
        let hash = manager.hash_password("s3cret-pass").await.unwrap();
        assert!(manager.verify_password("s3cret-pass", &hash).await.unwrap());
        assert!(!manager.verify_password("wrong", &hash).await.unwrap());
        assert!(!manager.verify_password("s3cret-pass", "not-a-hash").await.unwrap());
    }
}
