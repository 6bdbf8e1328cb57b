use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::types::AuthClaims;
use crate::config::Config;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: Arc<str>,
    pub expiration_hours: i64,
}

impl TokenConfig {
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        Self {
            secret: Arc::from(secret),
            expiration_hours,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.token_expiration_hours)
    }

    /// Creates a new JWT token for the given e-mail
    #[instrument(skip(self, email))]
    pub fn create_token(&self, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::hours(self.expiration_hours)).timestamp() as usize;

        debug!(
            expiration_hours = self.expiration_hours,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = AuthClaims {
            email: email.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Validates signature and expiry and returns the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<AuthClaims, AppError> {
        debug!("Decoding and validating JWT token");

        decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                email = %data.claims.email,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}

/// Pulls the token out of an `Authorization` value.
///
/// Accepts a bare token or `<scheme> <token>`, as sent by Swagger UI. With a space
/// present the token is the second space-separated segment, so `Bearer  tok` yields `""`.
pub fn extract_token(header_value: &str) -> &str {
    if header_value.contains(' ') {
        header_value.split(' ').nth(1).unwrap_or_default()
    } else {
        header_value
    }
}
